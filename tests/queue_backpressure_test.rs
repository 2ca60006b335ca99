use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ordersim::catalog::InstrumentCatalog;
use ordersim::engine::config::SimConfig;
use ordersim::engine::generator::OrderGenerator;
use ordersim::engine::market::MarketState;
use ordersim::engine::order::{Actor, Order, Side};
use ordersim::engine::queue::OrderQueue;
use ordersim::engine::smoother::SmoothInterpolator;
use ordersim::engine::worker::producer_loop;

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

#[test]
fn push_fails_once_hard_capacity_is_reached() {
    let queue = OrderQueue::with_capacity(8);
    let producer = queue.producer();

    for i in 0..8 {
        assert!(producer.push(sample_order(i)).is_ok());
    }
    assert_eq!(queue.len(), 8);

    // The ninth push hands the order back instead of growing the queue.
    let rejected = producer.push(sample_order(8));
    assert!(rejected.is_err());
    assert_eq!(rejected.unwrap_err().category_id, 8);
    assert_eq!(queue.len(), 8);
    assert_eq!(queue.push_count(), 8);
    assert_eq!(queue.reject_count(), 1);
}

#[test]
fn single_producer_items_dequeue_in_fifo_order() {
    let queue = OrderQueue::with_capacity(16);
    let producer = queue.producer();
    let consumer = queue.consumer();

    for i in 0..10 {
        producer.push(sample_order(i)).unwrap();
    }
    for i in 0..10 {
        assert_eq!(consumer.pop().unwrap().category_id, i);
    }
    assert!(consumer.pop().is_none());
    assert_eq!(queue.pop_count(), 10);
}

#[tokio::test]
async fn producer_backs_off_at_soft_threshold() {
    let config = Arc::new(SimConfig {
        queue_capacity: 8,
        queue_soft_threshold: 4,
        order_interval: Duration::from_millis(2),
        backpressure_pause: Duration::from_millis(5),
        burst_probability: 0.0,
        ..SimConfig::default()
    });

    let catalog = Arc::new(InstrumentCatalog::builtin());
    let smoother = SmoothInterpolator::new(config.ema_alpha, config.max_change, config.smooth_steps);
    let market = Arc::new(MarketState::new(
        catalog.clone(),
        smoother,
        config.impact_coefficient,
        config.price_floor,
    ));
    let generator = Arc::new(OrderGenerator::new(catalog, market, &config).unwrap());

    let queue = Arc::new(OrderQueue::with_capacity(config.queue_capacity));
    let producer = queue.producer();

    // Pre-fill exactly to the soft threshold; no consumer drains the queue.
    for i in 0..4 {
        producer.push(sample_order(i)).unwrap();
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let handle = tokio::spawn(producer_loop(
        0,
        generator,
        queue.producer(),
        Actor::Bot,
        config.clone(),
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.store(true, Ordering::Relaxed);
    handle.await.unwrap();

    // The producer observed the soft threshold and never enqueued.
    assert_eq!(queue.len(), 4);
    assert_eq!(queue.push_count(), 4);
    assert!(queue.len() <= queue.capacity());
}

#[tokio::test]
async fn sustained_production_never_exceeds_hard_capacity() {
    let config = Arc::new(SimConfig {
        queue_capacity: 8,
        queue_soft_threshold: 8,
        order_interval: Duration::from_millis(1),
        backpressure_pause: Duration::from_millis(1),
        burst_probability: 0.5,
        burst_multiplier: 6,
        ..SimConfig::default()
    });

    let catalog = Arc::new(InstrumentCatalog::builtin());
    let smoother = SmoothInterpolator::new(config.ema_alpha, config.max_change, config.smooth_steps);
    let market = Arc::new(MarketState::new(
        catalog.clone(),
        smoother,
        config.impact_coefficient,
        config.price_floor,
    ));
    let generator = Arc::new(OrderGenerator::new(catalog, market, &config).unwrap());

    let queue = Arc::new(OrderQueue::with_capacity(config.queue_capacity));
    let shutdown = Arc::new(AtomicBool::new(false));

    let mut handles = Vec::new();
    for i in 0..3 {
        handles.push(tokio::spawn(producer_loop(
            i,
            generator.clone(),
            queue.producer(),
            Actor::Bot,
            config.clone(),
            shutdown.clone(),
        )));
    }

    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(queue.len() <= queue.capacity());
    }

    shutdown.store(true, Ordering::Relaxed);
    for handle in handles {
        handle.await.unwrap();
    }
    assert!(queue.len() <= queue.capacity());
}
