use std::sync::Arc;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::catalog::InstrumentCatalog;
use crate::engine::config::SimConfig;
use crate::engine::market::MarketState;
use crate::engine::order::{format_price, round_dp, Actor, Order, Side};
use crate::DynError;

/// Produces one order per invocation: weighted instrument choice, weighted
/// side choice, uniform quantity, and a price read from MarketState after
/// applying this order's own impact.
pub struct OrderGenerator {
    catalog: Arc<InstrumentCatalog>,
    market: Arc<MarketState>,
    instrument_dist: WeightedIndex<f64>,
    side_dist: WeightedIndex<u32>,
    qty_min: f64,
    qty_max: f64,
}

impl OrderGenerator {
    pub fn new(
        catalog: Arc<InstrumentCatalog>,
        market: Arc<MarketState>,
        config: &SimConfig,
    ) -> Result<Self, DynError> {
        let instrument_dist =
            WeightedIndex::new(catalog.instruments().iter().map(|i| i.weight))?;
        let side_dist = WeightedIndex::new([config.side_buy_weight, config.side_sell_weight])?;

        Ok(Self {
            catalog,
            market,
            instrument_dist,
            side_dist,
            qty_min: config.qty_min,
            qty_max: config.qty_max,
        })
    }

    /// Generate one order for the given actor.
    ///
    /// Applying the impact is a deliberate side effect: every generated
    /// order moves the shared market price before being priced off it.
    /// Returns `None` when the instrument has no resolvable price, in which
    /// case the tick is skipped rather than emitting an invalid order.
    pub fn generate<R: Rng>(&self, rng: &mut R, actor: Actor) -> Option<Order> {
        let instrument = &self.catalog.instruments()[self.instrument_dist.sample(rng)];

        let side = match self.side_dist.sample(rng) {
            0 => Side::Buy,
            _ => Side::Sell,
        };
        let quantity = round_dp(rng.gen_range(self.qty_min..=self.qty_max), 4);

        let post_impact = self
            .market
            .apply_impact(&instrument.symbol, side, quantity)?;

        let (member_id, is_bot) = match actor {
            Actor::Bot => (None, true),
            Actor::User(id) => (Some(id), false),
        };

        Some(Order {
            member_id,
            category_id: instrument.category_id,
            order_price: format_price(post_impact),
            order_count: quantity,
            side,
            is_bot,
            symbol: instrument.symbol.clone(),
        })
    }
}
