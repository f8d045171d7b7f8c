//! sea-orm entities for the auth service database.

pub mod password_reset_tokens;
pub mod refresh_tokens;
pub mod two_factor_codes;
pub mod users;
