use std::sync::Arc;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::InstrumentCatalog;
use crate::engine::order::Side;
use crate::engine::smoother::{SmoothInterpolator, SmootherState};

struct InstrumentState {
    price: f64,
    smoother: SmootherState,
}

impl InstrumentState {
    fn new(base_price: f64, alpha: f64) -> Self {
        Self {
            price: base_price,
            smoother: SmootherState::new(alpha),
        }
    }
}

/// Authoritative simulated price per instrument, shared by all workers.
///
/// Entries are created lazily from the catalog base price on first touch.
/// All mutation of an instrument (impact application, smoothing state) runs
/// under that instrument's DashMap entry lock, so updates are never lost and
/// unrelated instruments never contend.
pub struct MarketState {
    catalog: Arc<InstrumentCatalog>,
    instruments: DashMap<String, InstrumentState>,
    smoother: SmoothInterpolator,
    impact_coefficient: f64,
    price_floor: f64,
}

impl MarketState {
    pub fn new(
        catalog: Arc<InstrumentCatalog>,
        smoother: SmoothInterpolator,
        impact_coefficient: f64,
        price_floor: f64,
    ) -> Self {
        Self {
            catalog,
            instruments: DashMap::new(),
            smoother,
            impact_coefficient,
            price_floor,
        }
    }

    /// Apply one order's price impact and return the post-impact price.
    ///
    /// BUY pushes the price up by `quantity * impact_coefficient`, SELL
    /// pushes it down. The result never goes below the configured floor, so
    /// the price stays strictly positive. Returns `None` for instruments the
    /// catalog does not know (the caller skips the tick).
    pub fn apply_impact(&self, symbol: &str, side: Side, quantity: f64) -> Option<f64> {
        let base_price = self.catalog.get(symbol)?.base_price;
        let alpha = self.smoother.alpha;

        let mut entry = self
            .instruments
            .entry(symbol.to_string())
            .or_insert_with(|| InstrumentState::new(base_price, alpha));

        let impact = quantity * self.impact_coefficient;
        let factor = match side {
            Side::Buy => 1.0 + impact,
            Side::Sell => 1.0 - impact,
        };
        entry.price = (entry.price * factor).max(self.price_floor);
        Some(entry.price)
    }

    /// Current simulated price, or the catalog base price for instruments
    /// not yet touched by any order. `None` for unknown instruments.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        if let Some(entry) = self.instruments.get(symbol) {
            return Some(entry.price);
        }
        self.catalog.get(symbol).map(|inst| inst.base_price)
    }

    /// Feed the instrument's current price through the smoother, returning
    /// chart-ready frames. Smoothing state mutates under the entry lock.
    pub fn smooth_observation(&self, symbol: &str) -> Option<Vec<f64>> {
        let base_price = self.catalog.get(symbol)?.base_price;
        let alpha = self.smoother.alpha;

        let mut entry = self
            .instruments
            .entry(symbol.to_string())
            .or_insert_with(|| InstrumentState::new(base_price, alpha));

        let raw = entry.price;
        let mut rng = StdRng::from_entropy();
        Some(self.smoother.smooth(&mut entry.smoother, raw, &mut rng))
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }
}
