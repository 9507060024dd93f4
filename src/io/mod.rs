//! File output for the aggregation reports.

pub mod export;
