pub mod access;
pub mod auth;
pub mod evaluation;
pub mod org;
pub mod round;
