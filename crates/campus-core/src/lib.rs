//! Ambient building blocks shared by campus platform services.
//!
//! Configuration loading, tracing setup, the wall-clock and email-delivery
//! capabilities, and the health/request-id plumbing every router mounts.

pub mod clock;
pub mod config;
pub mod email;
pub mod health;
pub mod middleware;
pub mod tracing;
