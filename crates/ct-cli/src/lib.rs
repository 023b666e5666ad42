pub mod bootstrap;
pub mod config;
pub mod extractor;
pub mod outbound;
pub mod pipeline;
pub mod report;
pub mod table;
pub mod telemetry;
