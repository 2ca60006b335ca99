use crate::DynError;

/// A tradable instrument as known to the downstream platform.
///
/// `category_id` is the platform's identifier for the instrument (what the
/// order intake API expects), `weight` drives the relative sampling
/// probability in the generator, and `base_price` seeds the simulated market
/// price for the first observation.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub symbol: String,
    pub category_id: u32,
    pub weight: f64,
    pub base_price: f64,
}

impl Instrument {
    pub fn new(symbol: &str, category_id: u32, weight: f64, base_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            category_id,
            weight,
            base_price,
        }
    }
}

/// Read-only snapshot of the instrument universe.
///
/// Loaded once at startup; the engine never mutates it. An empty or
/// malformed catalog is a fatal configuration error, the simulator must not
/// start workers against it.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
}

impl InstrumentCatalog {
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, DynError> {
        if instruments.is_empty() {
            return Err("instrument catalog is empty".into());
        }

        for inst in &instruments {
            if inst.symbol.is_empty() {
                return Err("instrument with empty symbol in catalog".into());
            }
            if inst.base_price <= 0.0 {
                return Err(format!("{}: base price must be > 0", inst.symbol).into());
            }
            if inst.weight <= 0.0 {
                return Err(format!("{}: weight must be > 0", inst.symbol).into());
            }
        }

        let mut symbols: Vec<&str> = instruments.iter().map(|i| i.symbol.as_str()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        if symbols.len() != instruments.len() {
            return Err("duplicate symbol in catalog".into());
        }

        Ok(Self { instruments })
    }

    /// Built-in snapshot matching the seed data of the downstream platform.
    ///
    /// Stands in for the catalog loader (relational store / market-data feed),
    /// which is an external collaborator. Weights are relative, they do not
    /// need to sum to anything.
    pub fn builtin() -> Self {
        let instruments = vec![
            Instrument::new("BTC", 41, 40.0, 50_000.0),
            Instrument::new("ETH", 42, 25.0, 3_000.0),
            Instrument::new("SOL", 43, 10.0, 120.0),
            Instrument::new("XRP", 44, 8.0, 0.8),
            Instrument::new("ADA", 46, 7.0, 1.2),
            Instrument::new("DOGE", 47, 5.0, 0.25),
            Instrument::new("AVAX", 48, 3.0, 25.0),
            Instrument::new("DOT", 49, 2.0, 10.0),
        ];

        // The table above is statically valid.
        Self { instruments }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
