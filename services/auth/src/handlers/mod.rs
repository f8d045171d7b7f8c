pub mod health;
pub mod login;
pub mod password;
pub mod token;
