//! Analysis pipeline orchestration

pub mod orchestrator;

pub use orchestrator::{analyze_file, run, PipelineResult};
