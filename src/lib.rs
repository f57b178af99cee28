//! Placeholder bearer tokens for API-testing environments.
//!
//! When no identity provider is reachable, [`run`] reads `client_id` from an
//! [`EnvironmentStore`], fabricates an unsigned JWT-shaped string and stores
//! it under `jwt_token`, so requests using `Bearer {{jwt_token}}` can proceed.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use jwt_mock::{run, HookOutcome, MockTokenConfig};
//!
//! let mut env = HashMap::from([("client_id".to_string(), "abc123".to_string())]);
//! let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();
//!
//! assert!(matches!(outcome, HookOutcome::Fabricated(_)));
//! assert!(env["jwt_token"].ends_with(".simulated_signature_hash"));
//! ```

pub mod env;
pub mod hook;
pub mod token;

pub use env::{
    EnvironmentError, EnvironmentStore, EnvironmentVariable, Overlay, PostmanEnvironment,
};
pub use hook::{run, run_at, AbortReason, Credentials, HookOutcome};
pub use token::{decode_claims, fabricate, is_fabricated, MockClaims, MockTokenConfig, TokenError};
