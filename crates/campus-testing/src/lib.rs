//! Test utilities for campus services.
//!
//! Provides `ManualClock`, recording/failing email senders and bearer-header
//! helpers. Import from `[dev-dependencies]` only.

pub mod auth;
pub mod clock;
pub mod email;
