//! Exploratory reporting over the SF COVID-19 daily testing dataset.

pub mod export;
pub mod fetch;
pub mod ingest;
pub mod report;
pub mod stats;
pub mod table;
