//! Auth types shared across campus platform services.
//!
//! Provides access-token validation, the refresh-token cookie builders, and
//! the `BearerToken` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
