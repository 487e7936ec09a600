//! Enumerates an organization's repositories on the hosting service.

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

use crate::credentials::CredentialProvider;
use crate::error::{Error, Result};

/// GitHub REST endpoint used when no other base URL is configured.
pub const GITHUB_API: &str = "https://api.github.com";

const PAGE_SIZE: usize = 100;

/// A repository as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoDescriptor {
    /// `<owner>/<name>`; also the clone location below the clone root.
    pub full_name: String,
    pub clone_url: String,
    pub default_branch: String,
}

/// Lists the repositories of an organization.
pub trait RepositoryHost: Send + Sync {
    fn list_repositories(&self, organization: &str) -> Result<Vec<RepoDescriptor>>;
}

/// GitHub organization listing over the REST API.
pub struct GitHubHost<'a> {
    api_base: String,
    credentials: &'a dyn CredentialProvider,
    client: Client,
}

impl<'a> GitHubHost<'a> {
    pub fn new(credentials: &'a dyn CredentialProvider) -> Self {
        Self::with_api_base(GITHUB_API, credentials)
    }

    pub fn with_api_base(api_base: &str, credentials: &'a dyn CredentialProvider) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
            client: Client::new(),
        }
    }

    fn page_url(&self, organization: &str, page: usize) -> String {
        format!(
            "{}/orgs/{}/repos?per_page={}&page={}",
            self.api_base, organization, PAGE_SIZE, page
        )
    }

    fn fetch_page(
        &self,
        organization: &str,
        token: &str,
        page: usize,
    ) -> Result<Vec<RepoDescriptor>> {
        let url = self.page_url(organization, page);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("confgen/", env!("CARGO_PKG_VERSION")))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Hosting {
                org: organization.to_string(),
                message: format!("{} returned {}", url, status),
            });
        }
        Ok(response.json()?)
    }
}

impl RepositoryHost for GitHubHost<'_> {
    fn list_repositories(&self, organization: &str) -> Result<Vec<RepoDescriptor>> {
        let token = self.credentials.token()?;
        info!("Getting all repos from {}", organization);

        let repos = collect_pages(|page| self.fetch_page(organization, &token, page))?;

        info!("{} repositories in {}", repos.len(), organization);
        Ok(repos)
    }
}

/// Request pages starting at 1 and concatenate them until a page comes back
/// with fewer than [`PAGE_SIZE`] entries.
fn collect_pages<F>(mut fetch: F) -> Result<Vec<RepoDescriptor>>
where
    F: FnMut(usize) -> Result<Vec<RepoDescriptor>>,
{
    let mut repos = Vec::new();
    for page in 1.. {
        let batch = fetch(page)?;
        let done = batch.len() < PAGE_SIZE;
        repos.extend(batch);
        if done {
            break;
        }
    }
    Ok(repos)
}
