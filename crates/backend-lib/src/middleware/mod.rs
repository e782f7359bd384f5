// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the Ex Libris server.

pub mod gate;

pub use gate::enforce_gate;
