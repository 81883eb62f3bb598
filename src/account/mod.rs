//! Account provisioning and per-account service records.

pub mod record;
pub mod registry;

pub use record::{validate_username, AccountRecord, ServiceRecord};
pub use registry::AccountRegistry;
