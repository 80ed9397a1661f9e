//! Core types and traits for the signal toolkit.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, PriceSeries)
//! - Signals, their lifecycle status, and trade results
//! - Collaborator traits for indicators, price providers, signal stores and notifiers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{SigkitError, SigkitResult};
pub use types::*;
pub use traits::*;
