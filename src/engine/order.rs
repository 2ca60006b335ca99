use serde::Serialize;

/// Order side as the intake API expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Who an order is attributed to. The generator never decides this, the
/// supervisor assigns one actor per producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Bot,
    User(u64),
}

/// One synthetic order, produced once and consumed exactly once.
///
/// Serializes to the intake API's JSON body: `memberId` is null for bot
/// orders, `orderType` is `"BUY"`/`"SELL"`. The symbol is kept for log lines
/// only and never sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub member_id: Option<u64>,
    pub category_id: u32,
    pub order_price: f64,
    pub order_count: f64,
    #[serde(rename = "orderType")]
    pub side: Side,
    pub is_bot: bool,
    #[serde(skip)]
    pub symbol: String,
}

pub(crate) fn round_dp(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Magnitude-dependent price rounding for the intake API.
///
/// Large prices lose sub-unit precision (the platform charts them in whole
/// units), small prices keep more decimals so sub-unit instruments stay
/// meaningful. Applying the rule twice yields the same value.
pub fn format_price(price: f64) -> f64 {
    if price <= 0.0 {
        return 0.01;
    }

    if price >= 1_000_000.0 {
        (price / 1_000.0).round() * 1_000.0
    } else if price >= 100_000.0 {
        (price / 100.0).round() * 100.0
    } else if price >= 100.0 {
        price.round()
    } else if price >= 10.0 {
        round_dp(price, 1)
    } else if price >= 1.0 {
        round_dp(price, 2)
    } else {
        round_dp(price, 4)
    }
}
