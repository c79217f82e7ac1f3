//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the warehouse backend
//! - `memory`: seeded in-memory backend (demo mode, tests)
//! - `sanitize`: credential filtering for logs

pub mod http;
pub mod memory;
pub mod sanitize;
