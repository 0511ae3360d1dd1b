//! # Model Sample Library
//!
//! Fixture models built on [`model_framework`], exposed for the demo binary and
//! the integration tests.

pub mod model;
