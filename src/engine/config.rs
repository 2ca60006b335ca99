use std::str::FromStr;
use std::time::Duration;

use crate::DynError;

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Configuration for the order simulation engine.
///
/// Everything is environment-driven with defaults matching the downstream
/// platform's local setup, so `ordersim` runs against a dev instance with no
/// configuration at all.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Order intake endpoint (`POST`, JSON body).
    pub order_endpoint: String,
    /// Shared secret sent as `X-Internal-Token` on every delivery.
    pub secret_token: String,
    /// Member ids used for simulated end-user orders (comma-separated env).
    /// Empty means every producer emits bot orders.
    pub user_ids: Vec<u64>,

    /// Producer pool size.
    pub producers: usize,
    /// Consumer pool size.
    pub consumers: usize,
    /// Base inter-order interval per producer (jittered at runtime).
    pub order_interval: Duration,
    /// Probability that a producer tick emits a burst instead of one order.
    pub burst_probability: f64,
    /// Orders emitted per burst tick.
    pub burst_multiplier: usize,

    /// Hard queue capacity. Enqueue past this fails outright.
    pub queue_capacity: usize,
    /// Soft threshold at which producers back off before enqueuing.
    pub queue_soft_threshold: usize,
    /// Producer pause when the queue is saturated.
    pub backpressure_pause: Duration,
    /// Consumer poll interval while the queue is empty.
    pub idle_poll: Duration,
    /// Consumer pause after a failed delivery.
    pub fail_backoff: Duration,
    /// HTTP request timeout for deliveries.
    pub request_timeout: Duration,

    /// EMA smoothing factor for chart frames.
    pub ema_alpha: f64,
    /// Maximum per-observation raw price change ratio before clamping.
    pub max_change: f64,
    /// Interpolated frames per raw price observation.
    pub smooth_steps: usize,
    /// Chart feed sampling interval.
    pub chart_interval: Duration,

    /// Price movement per unit of order quantity.
    pub impact_coefficient: f64,
    /// Lowest price an instrument can be driven to.
    pub price_floor: f64,
    /// Relative BUY weight for side selection.
    pub side_buy_weight: u32,
    /// Relative SELL weight for side selection.
    pub side_sell_weight: u32,
    /// Order quantity range (uniform).
    pub qty_min: f64,
    pub qty_max: f64,
}

impl SimConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Result<Self, DynError> {
        let user_ids = std::env::var("USER_IDS")
            .ok()
            .map(|s| {
                s.split(',')
                    .filter_map(|id| id.trim().parse::<u64>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            order_endpoint: env_string("ORDER_ENDPOINT", "http://localhost:8080/api/orders"),
            secret_token: env_string("SECRET_TOKEN", "heartbit-internal-secret-token"),
            user_ids,

            producers: env_parse("PRODUCERS", 4),
            consumers: env_parse("CONSUMERS", 3),
            order_interval: Duration::from_millis(env_parse("ORDER_INTERVAL_MS", 400)),
            burst_probability: env_parse("BURST_PROBABILITY", 0.08),
            burst_multiplier: env_parse("BURST_MULTIPLIER", 6),

            queue_capacity: env_parse("QUEUE_CAPACITY", 500),
            queue_soft_threshold: env_parse("QUEUE_SOFT_THRESHOLD", 400),
            backpressure_pause: Duration::from_millis(env_parse("BACKPRESSURE_PAUSE_MS", 50)),
            idle_poll: Duration::from_millis(env_parse("IDLE_POLL_MS", 100)),
            fail_backoff: Duration::from_millis(env_parse("FAIL_BACKOFF_MS", 200)),
            request_timeout: Duration::from_millis(env_parse("REQUEST_TIMEOUT_MS", 2_000)),

            ema_alpha: env_parse("EMA_ALPHA", 0.15),
            max_change: env_parse("MAX_CHANGE", 0.003),
            smooth_steps: env_parse("SMOOTH_STEPS", 5),
            chart_interval: Duration::from_millis(env_parse("CHART_INTERVAL_MS", 1_000)),

            impact_coefficient: env_parse("IMPACT_COEFFICIENT", 0.0005),
            price_floor: env_parse("PRICE_FLOOR", 0.01),
            side_buy_weight: env_parse("SIDE_BUY_WEIGHT", 55),
            side_sell_weight: env_parse("SIDE_SELL_WEIGHT", 45),
            qty_min: env_parse("QTY_MIN", 0.1),
            qty_max: env_parse("QTY_MAX", 5.0),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), DynError> {
        if self.order_endpoint.is_empty() {
            return Err("ORDER_ENDPOINT cannot be empty".into());
        }
        if self.secret_token.is_empty() {
            return Err("SECRET_TOKEN cannot be empty".into());
        }
        if self.producers == 0 {
            return Err("PRODUCERS must be greater than 0".into());
        }
        if self.consumers == 0 {
            return Err("CONSUMERS must be greater than 0".into());
        }
        if !(0.0..=1.0).contains(&self.burst_probability) {
            return Err("BURST_PROBABILITY must be within [0, 1]".into());
        }
        if self.burst_multiplier == 0 {
            return Err("BURST_MULTIPLIER must be greater than 0".into());
        }
        if self.queue_capacity == 0 {
            return Err("QUEUE_CAPACITY must be greater than 0".into());
        }
        if self.queue_soft_threshold > self.queue_capacity {
            return Err("QUEUE_SOFT_THRESHOLD cannot exceed QUEUE_CAPACITY".into());
        }
        if !(0.0..1.0).contains(&self.ema_alpha) || self.ema_alpha == 0.0 {
            return Err("EMA_ALPHA must be within (0, 1)".into());
        }
        if !(0.0..1.0).contains(&self.max_change) || self.max_change == 0.0 {
            return Err("MAX_CHANGE must be within (0, 1)".into());
        }
        if self.smooth_steps == 0 {
            return Err("SMOOTH_STEPS must be greater than 0".into());
        }
        if self.impact_coefficient <= 0.0 {
            return Err("IMPACT_COEFFICIENT must be greater than 0".into());
        }
        if self.price_floor <= 0.0 {
            return Err("PRICE_FLOOR must be greater than 0".into());
        }
        if self.side_buy_weight + self.side_sell_weight == 0 {
            return Err("side weights cannot both be 0".into());
        }
        if self.qty_min <= 0.0 || self.qty_min >= self.qty_max {
            return Err("quantity range must satisfy 0 < QTY_MIN < QTY_MAX".into());
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            order_endpoint: "http://localhost:8080/api/orders".to_string(),
            secret_token: "heartbit-internal-secret-token".to_string(),
            user_ids: Vec::new(),

            producers: 4,
            consumers: 3,
            order_interval: Duration::from_millis(400),
            burst_probability: 0.08,
            burst_multiplier: 6,

            queue_capacity: 500,
            queue_soft_threshold: 400,
            backpressure_pause: Duration::from_millis(50),
            idle_poll: Duration::from_millis(100),
            fail_backoff: Duration::from_millis(200),
            request_timeout: Duration::from_millis(2_000),

            ema_alpha: 0.15,
            max_change: 0.003,
            smooth_steps: 5,
            chart_interval: Duration::from_millis(1_000),

            impact_coefficient: 0.0005,
            price_floor: 0.01,
            side_buy_weight: 55,
            side_sell_weight: 45,
            qty_min: 0.1,
            qty_max: 5.0,
        }
    }
}
