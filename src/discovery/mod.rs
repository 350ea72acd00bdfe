//! File scanning for the batch driver

pub mod scanner;

pub use scanner::{scan, DiscoveredFile};
