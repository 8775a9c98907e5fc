//! Authorization collaborator.
//!
//! The browsing core never decides access itself; it asks an `Authorizer`
//! whether a subject may perform an action on an organization. The bundled
//! implementation is a flat allow-list read from the `[[policy]]` tables of
//! the config file, with `*` matching any subject or organization.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

pub trait Authorizer: Send + Sync {
    fn enforce(&self, subject: &str, org: &str, action: Action) -> bool;
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRule {
    pub subject: String,
    pub org: String,
    pub actions: Vec<Action>,
}

impl PolicyRule {
    fn matches(&self, subject: &str, org: &str, action: Action) -> bool {
        (self.subject == "*" || self.subject == subject)
            && (self.org == "*" || self.org == org)
            && self.actions.contains(&action)
    }
}

/// Deny-by-default allow-list.
#[derive(Debug, Clone, Default)]
pub struct PolicyAuthorizer {
    rules: Vec<PolicyRule>,
}

impl PolicyAuthorizer {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }
}

impl Authorizer for PolicyAuthorizer {
    fn enforce(&self, subject: &str, org: &str, action: Action) -> bool {
        self.rules.iter().any(|r| r.matches(subject, org, action))
    }
}
