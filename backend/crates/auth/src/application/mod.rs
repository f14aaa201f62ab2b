//! Application Layer
//!
//! Use cases and application services.

pub mod access_stats;
pub mod authenticate;
pub mod check_session;
pub mod config;
pub mod logout;
pub mod maintenance;
pub mod manage_users;
pub mod two_factor_admin;
pub mod verify_two_factor;

// Re-exports
pub use access_stats::AccessStatsUseCase;
pub use authenticate::{AuthenticateInput, AuthenticateOutput, AuthenticateUseCase};
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use logout::LogoutUseCase;
pub use maintenance::NormalizeRolesUseCase;
pub use manage_users::{CreateUserInput, ManageUsersUseCase, UpdateUserInput};
pub use two_factor_admin::{TotpSetupOutput, TwoFactorAdminUseCase};
pub use verify_two_factor::{VerifyTwoFactorOutput, VerifyTwoFactorUseCase};
