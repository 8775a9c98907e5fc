//! Process-wide, read-only state shared by every request handler.

use std::sync::Arc;

use crate::auth::{Action, Authorizer, PolicyAuthorizer, TokenCodec};
use crate::config::AppConfig;
use crate::git::{Annotator, RepoStore};

pub struct AppState {
    pub config: AppConfig,
    pub codec: TokenCodec,
    pub authorizer: Box<dyn Authorizer>,
    pub store: RepoStore,
    pub annotator: Annotator,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let authorizer = Box::new(PolicyAuthorizer::new(config.policy.clone()));
        Self::with_authorizer(config, authorizer)
    }

    pub fn with_authorizer(config: AppConfig, authorizer: Box<dyn Authorizer>) -> Self {
        Self {
            codec: TokenCodec::new(&config.secret),
            store: RepoStore::new(config.repos_dir.clone()),
            annotator: Annotator::new(&config.annotate),
            authorizer,
            config,
        }
    }

    /// Ignored organizations are invisible to everyone; the rest need a grant.
    pub fn can_read(&self, subject: &str, org: &str) -> bool {
        !self.config.is_ignored(org) && self.authorizer.enforce(subject, org, Action::Read)
    }
}
