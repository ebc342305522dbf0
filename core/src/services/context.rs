//! Client context attached to authentication flows.

/// Request-level client context (IP, user agent, coarse location) recorded
/// on sessions and refresh tokens and included in security audit logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub location: Option<String>,
}

impl ClientContext {
    pub fn new(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            user_agent: Some(user_agent.into()),
            location: None,
        }
    }

    /// IP for logging, with a placeholder when absent.
    pub fn ip_or_unknown(&self) -> &str {
        self.ip.as_deref().unwrap_or("unknown")
    }

    /// User agent for logging, with a placeholder when absent.
    pub fn user_agent_or_unknown(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("unknown")
    }
}
