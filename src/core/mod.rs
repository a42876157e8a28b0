//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Path resolution confined to the permitted roots
//! - Lossy line reading shared by tail and search
//! - Configuration and error types

pub mod config;
pub mod error;
pub mod lines;
pub mod model;
pub mod paths;
pub mod render;
