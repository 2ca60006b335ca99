use rand::Rng;

use crate::engine::order::round_dp;

/// Multiplicative jitter applied to each smoothed frame for visual variance.
const FRAME_JITTER: f64 = 0.00015;

/// Exponential moving average. Uninitialized until the first observation.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    pub fn update(&mut self, price: f64) -> f64 {
        let next = match self.value {
            None => price,
            Some(prev) => self.alpha * price + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// Per-instrument smoothing state.
///
/// `last_raw` is the clamp reference: clamp decisions always compare raw
/// against raw, never against the smoothed output, so the clamp cannot drift
/// with the EMA.
#[derive(Debug, Clone)]
pub struct SmootherState {
    last_raw: Option<f64>,
    ema: Ema,
}

impl SmootherState {
    pub fn new(alpha: f64) -> Self {
        Self {
            last_raw: None,
            ema: Ema::new(alpha),
        }
    }

    pub fn last_raw(&self) -> Option<f64> {
        self.last_raw
    }
}

/// Turns one raw price observation into a short sequence of chart-ready
/// frames: clamp the jump, interpolate, smooth through the EMA, jitter.
#[derive(Debug, Clone)]
pub struct SmoothInterpolator {
    pub alpha: f64,
    pub max_change: f64,
    pub steps: usize,
    pub jitter: f64,
}

impl SmoothInterpolator {
    pub fn new(alpha: f64, max_change: f64, steps: usize) -> Self {
        Self {
            alpha,
            max_change,
            steps,
            jitter: FRAME_JITTER,
        }
    }

    /// Limit `current`'s deviation from `prev` to `prev * max_change`.
    pub fn clamp(&self, prev: f64, current: f64) -> f64 {
        let diff = current - prev;
        let limit = prev * self.max_change;
        if diff.abs() > limit {
            prev + limit * diff.signum()
        } else {
            current
        }
    }

    /// Feed one raw observation through the smoother.
    ///
    /// The first observation for an instrument is passed through unchanged
    /// as a single frame (there is no prior state to interpolate from).
    /// Every later observation yields exactly `steps` frames.
    pub fn smooth<R: Rng>(&self, state: &mut SmootherState, raw: f64, rng: &mut R) -> Vec<f64> {
        let prev = match state.last_raw {
            None => {
                state.ema.update(raw);
                state.last_raw = Some(raw);
                return vec![round_dp(raw, 4)];
            }
            Some(prev) => prev,
        };

        let clamped = self.clamp(prev, raw);

        let delta = (clamped - prev) / self.steps as f64;
        let mut frames = Vec::with_capacity(self.steps);
        for i in 1..=self.steps {
            let interpolated = prev + delta * i as f64;
            let smoothed = state.ema.update(interpolated);
            let noise = smoothed * rng.gen_range(-self.jitter..=self.jitter);
            frames.push(round_dp(smoothed + noise, 4));
        }

        state.last_raw = Some(clamped);
        frames
    }
}
