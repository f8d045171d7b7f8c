pub mod opaque;
pub mod password;
pub mod refresh;
pub mod session;
pub mod sweep;
pub mod token;
pub mod two_factor;
