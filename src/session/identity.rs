use chrono::{DateTime, Utc};

/// Who logged in through the provisioning path, for this process only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            logged_in_at: Utc::now(),
        }
    }
}
