pub mod config;
pub mod dataset;
pub mod export;
pub mod labels;
pub mod metrics;
pub mod state;
