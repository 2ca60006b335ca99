use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::config::SimConfig;
use crate::engine::delivery::OrderSink;
use crate::engine::generator::OrderGenerator;
use crate::engine::market::MarketState;
use crate::engine::metrics::SimMetrics;
use crate::engine::order::Actor;
use crate::engine::queue::{OrderConsumer, OrderProducer, OrderQueue};
use crate::utils::ts_hm;

/// Producer loop: generate orders, enqueue, pace, occasionally burst.
///
/// Two distinct backpressure reactions: the soft threshold check pauses
/// before generating anything, and a rejected push (hard capacity) aborts
/// the current burst. Shutdown is cooperative, checked once per iteration.
pub async fn producer_loop(
    id: usize,
    generator: Arc<OrderGenerator>,
    producer: OrderProducer,
    actor: Actor,
    config: Arc<SimConfig>,
    shutdown: Arc<AtomicBool>,
) {
    eprintln!("[PRODUCER-{id}] started ({actor:?})");
    let mut rng = StdRng::from_entropy();

    while !shutdown.load(Ordering::Relaxed) {
        if producer.len() >= config.queue_soft_threshold {
            tokio::time::sleep(config.backpressure_pause).await;
            continue;
        }

        let burst = rng.gen_bool(config.burst_probability);
        let count = if burst { config.burst_multiplier } else { 1 };

        for _ in 0..count {
            // No resolvable price means skip the tick, not an error.
            let Some(order) = generator.generate(&mut rng, actor) else {
                continue;
            };
            if producer.push(order).is_err() {
                tokio::time::sleep(config.backpressure_pause).await;
                break;
            }
        }

        let jitter = rng.gen_range(0.8..1.2);
        let scale = if burst { jitter * 0.5 } else { jitter };
        tokio::time::sleep(config.order_interval.mul_f64(scale)).await;
    }

    eprintln!("[PRODUCER-{id}] stopped");
}

/// Consumer loop: drain the queue and deliver, counting outcomes.
///
/// A failed delivery (transport or status) is counted, logged, and followed
/// by a fixed backoff; the order is never requeued. An empty queue is just
/// an idle poll, not an error.
pub async fn consumer_loop(
    id: usize,
    consumer: OrderConsumer,
    sink: Arc<dyn OrderSink>,
    metrics: SimMetrics,
    config: Arc<SimConfig>,
    shutdown: Arc<AtomicBool>,
) {
    eprintln!("[CONSUMER-{id}] started");

    while !shutdown.load(Ordering::Relaxed) {
        let Some(order) = consumer.pop() else {
            tokio::time::sleep(config.idle_poll).await;
            continue;
        };

        match sink.deliver(&order).await {
            Ok(()) => {
                metrics.record_success();
                println!(
                    "[CONSUMER-{id}] {} {} {} @ {}",
                    order.symbol,
                    order.side.as_str(),
                    order.order_count,
                    order.order_price
                );
            }
            Err(err) => {
                metrics.record_failure();
                eprintln!("[CONSUMER-{id}] delivery failed: {err}");
                tokio::time::sleep(config.fail_backoff).await;
            }
        }
    }

    eprintln!("[CONSUMER-{id}] stopped");
}

/// Chart feed: periodically samples every instrument's simulated price and
/// runs it through the smoother, logging the latest frame per instrument.
pub async fn chart_loop(
    market: Arc<MarketState>,
    config: Arc<SimConfig>,
    shutdown: Arc<AtomicBool>,
) {
    let mut tick = tokio::time::interval(config.chart_interval);

    while !shutdown.load(Ordering::Relaxed) {
        tick.tick().await;

        let mut line = String::from("[CHART]");
        for instrument in market.catalog().instruments() {
            if let Some(frames) = market.smooth_observation(&instrument.symbol) {
                if let Some(last) = frames.last() {
                    line.push_str(&format!(" {}={last}", instrument.symbol));
                }
            }
        }
        println!("{line}");
    }
}

/// Once-per-second throughput line, sampled from the counters and the
/// live queue depth.
pub async fn reporter_loop(
    queue: Arc<OrderQueue>,
    metrics: SimMetrics,
    shutdown: Arc<AtomicBool>,
) {
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));
    let mut last_success = 0u64;

    while !shutdown.load(Ordering::Relaxed) {
        tick.tick().await;

        metrics.set_queue_depth(queue.len());
        let snapshot = metrics.snapshot();
        let tps = snapshot.succeeded.saturating_sub(last_success);
        last_success = snapshot.succeeded;

        println!(
            "[{}] Queue={} | TPS={} | Success={} | Fail={}",
            ts_hm(),
            snapshot.queue_depth,
            tps,
            snapshot.succeeded,
            snapshot.failed
        );
    }
}
