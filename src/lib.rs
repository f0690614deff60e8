pub mod cache;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod generator;
pub mod llm;
pub mod memory;
pub mod queue;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use queue::{ReportService, ReportStatus};
