//! The pre-request hook: guard, reuse check, fabricate, write back.

use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    env::{EnvironmentStore, CLIENT_ID, CLIENT_SECRET, JWT_TOKEN, TOKEN_URL},
    token::{fabricate, is_fabricated, preview, MockTokenConfig, TokenError},
};

/// Client credentials as found in the environment.
///
/// `client_secret` and `token_url` are read but not used; they are where a
/// real token exchange would get its inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
}

impl Credentials {
    pub fn read(store: &impl EnvironmentStore) -> Self {
        Self {
            client_id: store.get(CLIENT_ID),
            client_secret: store.get(CLIENT_SECRET),
            token_url: store.get(TOKEN_URL),
        }
    }

    fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Why the hook stopped before doing anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    MissingClientId,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::MissingClientId => write!(f, "no '{CLIENT_ID}' found"),
        }
    }
}

/// Where a run of the hook ended up. Every outcome is terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// The store was left untouched.
    Aborted(AbortReason),
    /// A real token was already present and was kept.
    Skipped,
    /// A new mock token was written under `jwt_token`.
    Fabricated(String),
}

impl HookOutcome {
    /// Whether the store was modified.
    pub fn wrote_token(&self) -> bool {
        matches!(self, HookOutcome::Fabricated(_))
    }
}

/// Runs the hook against the current wall clock.
pub fn run(
    store: &mut impl EnvironmentStore,
    config: &MockTokenConfig,
) -> Result<HookOutcome, TokenError> {
    run_at(store, config, chrono::Utc::now().timestamp())
}

/// Runs the hook as if the current time were `now` (Unix seconds).
pub fn run_at(
    store: &mut impl EnvironmentStore,
    config: &MockTokenConfig,
    now: i64,
) -> Result<HookOutcome, TokenError> {
    let credentials = Credentials::read(store);
    debug!(
        has_secret = credentials.client_secret.is_some(),
        token_url = credentials.token_url.as_deref().unwrap_or_default(),
        "Read client credentials."
    );

    let Some(client_id) = credentials.client_id() else {
        let reason = AbortReason::MissingClientId;
        warn!("{reason}. Skipping mock auth generation.");
        return Ok(HookOutcome::Aborted(reason));
    };

    match store.get(JWT_TOKEN) {
        Some(current) if !current.is_empty() && !is_fabricated(&current) => {
            info!("Existing token found. Using it.");
            return Ok(HookOutcome::Skipped);
        }
        Some(current) if !current.is_empty() => {
            debug!("Replacing previously fabricated token.");
        }
        _ => {}
    }

    info!(%client_id, "Simulating OAuth 2.0 exchange.");
    let token = fabricate(client_id, now, config)?;
    store.set(JWT_TOKEN, &token);

    info!(preview = %preview(&token), "Mock JWT generated and injected.");
    Ok(HookOutcome::Fabricated(token))
}
