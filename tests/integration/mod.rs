//! Integration tests module
//!
//! This module organizes all integration tests for the r-cueplayer crate.

// Import individual test modules
pub mod config_test;
