//! Clients that turn user actions into backend commands.
//!
//! - `dispatch`: timeout-bounded execution of a single backend command
//! - `credentials`: the credential store client (list/get/add/update/delete/generate)
//! - `accounts`: account provisioning, login, and service records

pub mod accounts;
pub mod credentials;
pub mod dispatch;

pub use accounts::AccountClient;
pub use credentials::CredentialClient;
pub use dispatch::BackendCaller;
