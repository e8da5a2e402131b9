pub mod aggregator;
pub mod analysis;
pub mod cancel;
pub mod config;
pub mod counting;
pub mod error;
pub mod ingest;
pub mod schedule;
pub mod scorer;
pub mod selector;
pub mod tables;

pub use lotocifras_db::models::{digits_of, Grouping, Position, CODE_SPACE};
