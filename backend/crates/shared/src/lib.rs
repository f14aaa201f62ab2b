//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest vocabulary shared by every tenant application:
//! - Unified error type and result aliases
//! - Typed ID wrappers
//!
//! **Design Principle**: only things that are hard to change and that mean
//! the same thing across all tenants belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
