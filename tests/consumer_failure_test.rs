use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ordersim::engine::config::SimConfig;
use ordersim::engine::delivery::{DeliveryError, OrderSink};
use ordersim::engine::metrics::SimMetrics;
use ordersim::engine::order::{Order, Side};
use ordersim::engine::queue::OrderQueue;
use ordersim::engine::worker::consumer_loop;

struct FailingSink;

#[async_trait::async_trait]
impl OrderSink for FailingSink {
    async fn deliver(&self, _order: &Order) -> Result<(), DeliveryError> {
        Err(DeliveryError::Status {
            code: 500,
            body: "internal error".to_string(),
        })
    }
}

struct AcceptingSink;

#[async_trait::async_trait]
impl OrderSink for AcceptingSink {
    async fn deliver(&self, _order: &Order) -> Result<(), DeliveryError> {
        Ok(())
    }
}

fn sample_order(tag: u32) -> Order {
    Order {
        member_id: None,
        category_id: tag,
        order_price: 50_000.0,
        order_count: 1.0,
        side: Side::Buy,
        is_bot: true,
        symbol: "BTC".to_string(),
    }
}

fn fast_config() -> Arc<SimConfig> {
    Arc::new(SimConfig {
        idle_poll: Duration::from_millis(5),
        fail_backoff: Duration::from_millis(1),
        ..SimConfig::default()
    })
}

async fn wait_until(metrics: &SimMetrics, attempted: u64) {
    for _ in 0..400 {
        if metrics.attempted() >= attempted {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "timed out waiting for {attempted} attempts, saw {}",
        metrics.attempted()
    );
}

#[tokio::test]
async fn failed_deliveries_are_counted_and_never_kill_the_consumer() {
    let queue = OrderQueue::with_capacity(16);
    let producer = queue.producer();
    for i in 0..3 {
        producer.push(sample_order(i)).unwrap();
    }

    let metrics = SimMetrics::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let handle = tokio::spawn(consumer_loop(
        0,
        queue.consumer(),
        Arc::new(FailingSink),
        metrics.clone(),
        fast_config(),
        shutdown.clone(),
    ));

    wait_until(&metrics, 3).await;

    // Exactly one failure per order, no successes, and the loop is alive.
    assert_eq!(metrics.failed(), 3);
    assert_eq!(metrics.succeeded(), 0);
    assert!(!handle.is_finished());

    // It keeps processing after the backoff.
    producer.push(sample_order(3)).unwrap();
    wait_until(&metrics, 4).await;
    assert_eq!(metrics.failed(), 4);

    shutdown.store(true, Ordering::Relaxed);
    handle.await.unwrap();
}

#[tokio::test]
async fn successful_deliveries_increment_only_the_success_counter() {
    let queue = OrderQueue::with_capacity(16);
    let producer = queue.producer();
    for i in 0..5 {
        producer.push(sample_order(i)).unwrap();
    }

    let metrics = SimMetrics::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let handle = tokio::spawn(consumer_loop(
        0,
        queue.consumer(),
        Arc::new(AcceptingSink),
        metrics.clone(),
        fast_config(),
        shutdown.clone(),
    ));

    wait_until(&metrics, 5).await;

    assert_eq!(metrics.succeeded(), 5);
    assert_eq!(metrics.failed(), 0);
    assert_eq!(metrics.attempted(), metrics.succeeded() + metrics.failed());

    shutdown.store(true, Ordering::Relaxed);
    handle.await.unwrap();
}

#[tokio::test]
async fn competing_consumers_process_each_order_exactly_once() {
    let queue = OrderQueue::with_capacity(64);
    let producer = queue.producer();
    for i in 0..40 {
        producer.push(sample_order(i)).unwrap();
    }

    let metrics = SimMetrics::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let config = fast_config();

    let mut handles = Vec::new();
    for i in 0..4 {
        handles.push(tokio::spawn(consumer_loop(
            i,
            queue.consumer(),
            Arc::new(AcceptingSink),
            metrics.clone(),
            config.clone(),
            shutdown.clone(),
        )));
    }

    wait_until(&metrics, 40).await;
    assert_eq!(metrics.succeeded(), 40);
    assert_eq!(queue.pop_count(), 40);

    shutdown.store(true, Ordering::Relaxed);
    for handle in handles {
        handle.await.unwrap();
    }
}
