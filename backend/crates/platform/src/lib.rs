//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the tenant applications:
//! - Cryptographic utilities (opaque random tokens)
//! - Password hashing (Argon2id, salted)
//! - Cookie management
//! - Client IP extraction

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
