//! State of the profile lookup window.
//!
//! A lookup is split in two so the UI thread never awaits: [`ProfileLookup::begin`]
//! clears the previous result and validates the input, the network work runs
//! elsewhere through [`fetch_snapshot`], and [`ProfileLookup::finish`] commits
//! the outcome.

use tracing::{info, warn};

use crate::client::GitHubApi;
use crate::error::LookupError;
use crate::models::GitHubUser;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Everything a successful lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub profile: GitHubUser,
    pub contributions: u64,
}

/// Display strings for the profile and contribution cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub display_name: String,
    pub handle: String,
    pub bio: String,
    pub profile_url: String,
    pub followers: String,
    pub following: String,
    pub repos: String,
    pub contributions: String,
}

#[derive(Debug, Default)]
pub struct ProfileLookup {
    phase: Phase,
    error: Option<LookupError>,
    profile: Option<GitHubUser>,
    contributions: Option<u64>,
}

impl ProfileLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<LookupError> {
        self.error
    }

    #[cfg(test)]
    pub fn profile(&self) -> Option<&GitHubUser> {
        self.profile.as_ref()
    }

    #[cfg(test)]
    pub fn contributions(&self) -> Option<u64> {
        self.contributions
    }

    /// Starts a new attempt and returns the identifier to look up.
    ///
    /// The previous error, profile and count are always cleared, even when
    /// the input is rejected.
    pub fn begin(&mut self, input: &str) -> Result<String, LookupError> {
        self.error = None;
        self.profile = None;
        self.contributions = None;

        let username = input.trim();
        if username.is_empty() {
            self.phase = Phase::Error;
            self.error = Some(LookupError::MissingInput);
            return Err(LookupError::MissingInput);
        }

        self.phase = Phase::Loading;
        Ok(username.to_string())
    }

    /// Commits the outcome of an attempt. Profile and count land together,
    /// so an error never sits next to a half-filled card.
    pub fn finish(&mut self, outcome: Result<Snapshot, LookupError>) {
        match outcome {
            Ok(snapshot) => {
                self.phase = Phase::Success;
                self.error = None;
                self.profile = Some(snapshot.profile);
                self.contributions = Some(snapshot.contributions);
            }
            Err(err) => {
                self.phase = Phase::Error;
                self.error = Some(err);
                self.profile = None;
                self.contributions = None;
            }
        }
    }

    /// `begin`, `fetch_snapshot` and `finish` in one await.
    #[cfg(test)]
    pub async fn submit<A: GitHubApi>(&mut self, api: &A, input: &str) -> Result<(), LookupError> {
        let username = self.begin(input)?;
        let outcome = fetch_snapshot(api, &username).await;
        let result = outcome.as_ref().map(|_| ()).map_err(|e| *e);
        self.finish(outcome);
        result
    }

    /// Whether the committed profile is the one this avatar belongs to.
    /// Avatars arrive after the card and may belong to an older attempt.
    pub fn shows_avatar(&self, avatar_url: &str) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| !p.avatar_url.is_empty() && p.avatar_url == avatar_url)
    }

    /// Acknowledgement for the "Claim Reward" button. Purely cosmetic.
    pub fn claim_reward(&self) -> Option<String> {
        self.contributions
            .map(|n| format!("You've claimed a reward for {n} contributions!"))
    }

    pub fn card(&self) -> Option<CardView> {
        let profile = self.profile.as_ref()?;
        Some(CardView {
            display_name: profile.name.clone().unwrap_or_default(),
            handle: format!("@{}", profile.login),
            bio: profile.bio.clone().unwrap_or_default(),
            profile_url: profile.html_url.clone(),
            followers: profile.followers.to_string(),
            following: profile.following.to_string(),
            repos: profile.public_repos.to_string(),
            contributions: self
                .contributions
                .map(|n| n.to_string())
                .unwrap_or_default(),
        })
    }
}

/// Runs the profile request, then the contribution query. The second call
/// is only made when the first succeeds.
pub async fn fetch_snapshot<A: GitHubApi>(api: &A, username: &str) -> Result<Snapshot, LookupError> {
    info!(username, "looking up profile");

    let profile = api.fetch_user(username).await.map_err(|e| {
        warn!(username, "profile request failed: {e:#}");
        LookupError::FetchFailed
    })?;

    let contributions = api.fetch_contributions(username).await.map_err(|e| {
        warn!(username, "contribution query failed: {e:#}");
        LookupError::FetchFailed
    })?;

    info!(username, contributions, "lookup finished");
    Ok(Snapshot {
        profile,
        contributions,
    })
}
