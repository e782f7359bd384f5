// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod token_generator;
mod service;
mod service_impl;

pub use password::{hash_password, verify_password, validate_password_strength};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
