//! Concentrated-liquidity position APR estimator
//!
//! Pipeline: `pools::PoolDataSource` -> `apr::ticks` -> range classification
//! -> `apr::fees` + `apr::emissions` -> `apr::report::AprReport`.

pub mod apis;
pub mod apr;
pub mod arguments;
pub mod config;
pub mod display;
pub mod errors;
pub mod logger;
pub mod pools;
