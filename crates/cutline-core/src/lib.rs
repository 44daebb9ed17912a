//! Cutline Core - Foundation types for the timeline engine
//!
//! This crate provides the fundamental types used throughout Cutline:
//! - Exact time representation (RationalTime, TimeRange)
//! - Canvas lengths (Dimension)
//! - Editor configuration
//! - Error types

pub mod config;
pub mod error;
pub mod geometry;
pub mod time;

pub use config::EditorConfig;
pub use error::{CutlineError, Result};
pub use geometry::Dimension;
pub use time::{RationalTime, TimeRange};
