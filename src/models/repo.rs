//! Organization/repository overview and session DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoInfo {
    pub name: String,
    /// `None` for a freshly initialized repository without any refs.
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrgInfo {
    pub name: String,
    pub repos: Vec<RepoInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeResponse {
    pub username: String,
    pub hostname: String,
    pub default_org: Option<String>,
    pub orgs: Vec<OrgInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SigninResponse {
    pub token: String,
}
