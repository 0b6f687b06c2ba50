//! Utility functions and helpers.

pub mod hash;
pub mod logging;

pub use hash::{FileDigests, HashAlgorithm, HashCalculator};
pub use logging::{cleanup_old_logs, init_logging, LogConfig};
