pub mod aggregator;
pub mod args;
pub mod charts;
pub mod enricher;
pub mod errors;
pub mod format;
pub mod loader;
pub mod pipeline;
pub mod profile;
pub mod report;
