use std::future::Future;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::Config;
use crate::models::{ContributionData, GitHubUser, GraphQlRequest, GraphQlResponse};

/// The two GitHub calls a lookup makes.
pub trait GitHubApi {
    fn fetch_user(&self, username: &str) -> impl Future<Output = Result<GitHubUser>> + Send;

    fn fetch_contributions(&self, username: &str) -> impl Future<Output = Result<u64>> + Send;
}

/// reqwest-backed GitHub client. Cheap to clone.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            api_url: Url::parse(&config.api_url).context("Invalid GitHub API URL")?,
            token: config.token.clone(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

/// Creates a preconfigured HTTP client with required headers.
pub fn build_client() -> Result<Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("rust-contribution-checker"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// Appends path segments to the API base. Each segment is percent-encoded,
/// so a `/` typed into the username can't reach another endpoint.
fn endpoint(api_url: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = api_url.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("GitHub API URL cannot have a path: {api_url}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn user_url(api_url: &Url, username: &str) -> Result<Url> {
    endpoint(api_url, &["users", username])
}

fn graphql_url(api_url: &Url) -> Result<Url> {
    endpoint(api_url, &["graphql"])
}

/// Pulls the yearly total out of a GraphQL envelope.
fn total_contributions(envelope: GraphQlResponse<ContributionData>) -> Result<u64> {
    if let Some(first) = envelope.errors.first() {
        anyhow::bail!("GitHub GraphQL error: {}", first.message);
    }

    let user = envelope
        .data
        .and_then(|data| data.user)
        .context("GraphQL response has no user")?;

    Ok(user
        .contributions_collection
        .contribution_calendar
        .total_contributions)
}

impl GitHubApi for GitHubClient {
    /// Fetches a GitHub user by username.
    async fn fetch_user(&self, username: &str) -> Result<GitHubUser> {
        let url = user_url(&self.api_url, username)?;
        debug!(%url, "fetching profile");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send request to GitHub API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error ({status}): {body}");
        }

        response
            .json::<GitHubUser>()
            .await
            .context("Failed to deserialize GitHub user response")
    }

    /// Queries the contribution calendar total over GraphQL.
    async fn fetch_contributions(&self, username: &str) -> Result<u64> {
        let token = self
            .token
            .as_deref()
            .context("GITHUB_TOKEN is not set; the GraphQL API requires a token")?;
        let url = graphql_url(&self.api_url)?;
        debug!(%url, "fetching contributions");

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&GraphQlRequest::contributions(username))
            .send()
            .await
            .context("Failed to send GraphQL request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub GraphQL API error ({status}): {body}");
        }

        let envelope = response
            .json::<GraphQlResponse<ContributionData>>()
            .await
            .context("Failed to deserialize GraphQL response")?;

        total_contributions(envelope)
    }
}
