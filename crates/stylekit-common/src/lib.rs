//! Common utilities for the stylekit export engine.
//!
//! This crate provides shared infrastructure used by all stylekit components:
//! - **Warning System** - deduplicated warnings for unsupported style input

pub mod warning;
