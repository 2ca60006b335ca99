use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::catalog::InstrumentCatalog;
use crate::engine::config::SimConfig;
use crate::engine::delivery::OrderSink;
use crate::engine::generator::OrderGenerator;
use crate::engine::market::MarketState;
use crate::engine::metrics::{MetricsSnapshot, SimMetrics};
use crate::engine::order::Actor;
use crate::engine::queue::OrderQueue;
use crate::engine::smoother::SmoothInterpolator;
use crate::engine::worker;
use crate::DynError;

/// Owns the shared state and the worker pools.
///
/// Startup wires one MarketState and one bounded queue into N producers and
/// M consumers plus the chart feed and the stats reporter. Shutdown is a
/// single flag observed cooperatively by every loop; `join` waits for all of
/// them, so an in-flight delivery gets to finish or time out naturally.
pub struct Supervisor {
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    metrics: SimMetrics,
    started_at: Instant,
}

impl Supervisor {
    pub fn start(
        config: SimConfig,
        catalog: InstrumentCatalog,
        sink: Arc<dyn OrderSink>,
    ) -> Result<Self, DynError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err("cannot start workers against an empty catalog".into());
        }

        let config = Arc::new(config);
        let catalog = Arc::new(catalog);

        let smoother =
            SmoothInterpolator::new(config.ema_alpha, config.max_change, config.smooth_steps);
        let market = Arc::new(MarketState::new(
            catalog.clone(),
            smoother,
            config.impact_coefficient,
            config.price_floor,
        ));
        let generator = Arc::new(OrderGenerator::new(catalog, market.clone(), &config)?);
        let queue = Arc::new(OrderQueue::with_capacity(config.queue_capacity));
        let metrics = SimMetrics::new();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(config.producers + config.consumers + 2);

        for i in 0..config.producers {
            let actor = Self::assign_actor(i, &config.user_ids);
            handles.push(tokio::spawn(worker::producer_loop(
                i,
                generator.clone(),
                queue.producer(),
                actor,
                config.clone(),
                shutdown.clone(),
            )));
        }

        for i in 0..config.consumers {
            handles.push(tokio::spawn(worker::consumer_loop(
                i,
                queue.consumer(),
                sink.clone(),
                metrics.clone(),
                config.clone(),
                shutdown.clone(),
            )));
        }

        handles.push(tokio::spawn(worker::chart_loop(
            market,
            config.clone(),
            shutdown.clone(),
        )));
        handles.push(tokio::spawn(worker::reporter_loop(
            queue,
            metrics.clone(),
            shutdown.clone(),
        )));

        Ok(Self {
            shutdown,
            handles,
            metrics,
            started_at: Instant::now(),
        })
    }

    /// Even producers emit bot orders; odd ones rotate through the
    /// configured end-user ids. With no user ids everything is a bot.
    fn assign_actor(index: usize, user_ids: &[u64]) -> Actor {
        if user_ids.is_empty() || index % 2 == 0 {
            Actor::Bot
        } else {
            Actor::User(user_ids[(index / 2) % user_ids.len()])
        }
    }

    /// Signal every worker to stop after its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for all workers to observe the shutdown flag and exit.
    /// Returns the final counters and the total run time.
    pub async fn join(self) -> (MetricsSnapshot, Duration) {
        for handle in self.handles {
            let _ = handle.await;
        }
        (self.metrics.snapshot(), self.started_at.elapsed())
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }
}
