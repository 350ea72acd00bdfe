//! Export formats for analysis results

pub mod json;

pub use json::write_json;
