pub mod config;
pub mod delivery;
pub mod generator;
pub mod market;
pub mod metrics;
pub mod order;
pub mod queue;
pub mod smoother;
pub mod supervisor;
pub mod worker;
