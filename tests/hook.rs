use std::collections::HashMap;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use jwt_mock::{
    decode_claims, run, AbortReason, EnvironmentStore, HookOutcome, MockClaims, MockTokenConfig,
    PostmanEnvironment,
};
use serde_json::json;

fn env_file(dir: &tempfile::TempDir, values: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("dev.postman_environment.json");
    let doc = json!({
        "name": "Payment Refund API - Dev",
        "values": values,
        "_postman_variable_scope": "environment"
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    path
}

fn is_token_shape(token: &str) -> bool {
    let Some(rest) = token.strip_prefix("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.") else {
        return false;
    };
    let Some(payload) = rest.strip_suffix(".simulated_signature_hash") else {
        return false;
    };
    !payload.is_empty()
        && payload
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[test]
fn scenario_a_fabricates_for_new_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = env_file(
        &dir,
        json!([{ "key": "client_id", "value": "abc123", "enabled": true }]),
    );

    let mut env = PostmanEnvironment::load(&path).unwrap();
    let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();
    env.save(&path).unwrap();

    let HookOutcome::Fabricated(token) = outcome else {
        panic!("expected a fabricated token, got {outcome:?}");
    };
    assert!(is_token_shape(&token));

    let saved = PostmanEnvironment::load(&path).unwrap();
    assert_eq!(saved.get("jwt_token"), Some(token.clone()));
    assert_eq!(saved.extra["_postman_variable_scope"], "environment");

    let claims = decode_claims(&token).unwrap();
    assert_eq!(claims.sub, "abc123");
    assert_eq!(claims.name, "Postman Case Study User");
    assert_eq!(claims.exp, claims.iat + 3600);
    assert_eq!(claims.scope, "refunds:write refunds:read");
}

#[test]
fn scenario_b_empty_client_id_writes_nothing() {
    let mut env = PostmanEnvironment::from_json(
        &json!({
            "name": "Dev",
            "values": [{ "key": "client_id", "value": "", "enabled": true }]
        })
        .to_string(),
    )
    .unwrap();
    let before = env.clone();

    let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();
    assert_eq!(outcome, HookOutcome::Aborted(AbortReason::MissingClientId));
    assert_eq!(env, before);
    assert_eq!(env.get("jwt_token"), None);
}

#[test]
fn disabled_client_id_counts_as_absent() {
    let mut env = PostmanEnvironment::from_json(
        &json!({
            "name": "Dev",
            "values": [{ "key": "client_id", "value": "abc123", "enabled": false }]
        })
        .to_string(),
    )
    .unwrap();

    let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();
    assert!(matches!(outcome, HookOutcome::Aborted(_)));
}

#[test]
fn scenario_c_real_token_is_kept() {
    let mut env = HashMap::from([
        ("client_id".to_string(), "abc123".to_string()),
        ("jwt_token".to_string(), "real.manual.token".to_string()),
    ]);

    let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();
    assert_eq!(outcome, HookOutcome::Skipped);
    assert_eq!(env["jwt_token"], "real.manual.token");
}

#[test]
fn scenario_d_fabricated_token_is_regenerated() {
    let stale = jwt_mock::fabricate("abc123", 1_600_000_000, &MockTokenConfig::default()).unwrap();
    let mut env = HashMap::from([
        ("client_id".to_string(), "abc123".to_string()),
        ("jwt_token".to_string(), stale.clone()),
    ]);

    let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();
    assert!(outcome.wrote_token());
    assert_ne!(env["jwt_token"], stale);

    let claims = decode_claims(&env["jwt_token"]).unwrap();
    assert!(claims.iat > 1_600_000_000);
    assert_eq!(claims.exp, claims.iat + 3600);
}

#[test]
fn starter_environment_gets_a_token() {
    let mut env = PostmanEnvironment::starter("Dev");
    let outcome = run(&mut env, &MockTokenConfig::default()).unwrap();

    assert!(outcome.wrote_token());
    let claims = decode_claims(&env.get("jwt_token").unwrap()).unwrap();
    assert_eq!(claims.sub, "demo_client_id_123");
}

#[test]
fn token_parses_as_unverified_jwt() {
    let mut env = HashMap::from([("client_id".to_string(), "abc123".to_string())]);
    let HookOutcome::Fabricated(token) = run(&mut env, &MockTokenConfig::default()).unwrap() else {
        panic!("expected a fabricated token");
    };

    let header = decode_header(&token).unwrap();
    assert_eq!(header.alg, Algorithm::HS256);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    let data = decode::<MockClaims>(&token, &DecodingKey::from_secret(b""), &validation).unwrap();
    assert_eq!(data.claims.sub, "abc123");
}

#[test]
fn token_fails_signature_check() {
    let token = jwt_mock::fabricate(
        "abc123",
        chrono::Utc::now().timestamp(),
        &MockTokenConfig::default(),
    )
    .unwrap();

    let result = decode::<MockClaims>(
        &token,
        &DecodingKey::from_secret(b"any-secret"),
        &Validation::new(Algorithm::HS256),
    );
    assert!(result.is_err());
}
