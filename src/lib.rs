use std::error::Error;

pub type DynError = Box<dyn Error + Send + Sync>;

pub mod catalog;
pub mod engine;
pub mod utils;
