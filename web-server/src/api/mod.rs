// web-server/src/api/mod.rs
pub mod admin;
pub mod auth;
pub mod public;
