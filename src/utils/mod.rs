//! Utility module with helper functions
//!
//! This module provides configuration handling.

mod config;

pub use config::{Config, DataConfig, ModelConfig, SnapshotConfig, TrainingConfigFile};
