//! Generate a mock token the way the pre-request hook does
//!
//! Usage: cargo run --example generate_mock_token -- [CLIENT_ID]
//!
//! The token has a JWT shape but no signature; anything that checks signatures
//! will reject it, which is the point.

use std::collections::HashMap;

use jwt_mock::{decode_claims, run, HookOutcome, MockTokenConfig};

fn main() {
    let client_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo_client_id_123".to_string());

    let mut env = HashMap::from([("client_id".to_string(), client_id)]);

    match run(&mut env, &MockTokenConfig::default()) {
        Ok(HookOutcome::Fabricated(token)) => {
            println!("Mock JWT for testing:");
            println!("{}", token);
            match decode_claims(&token) {
                Ok(claims) => println!("\n📝 Claims: {:?}", claims),
                Err(e) => println!("❌ Failed to decode claims: {}", e),
            }
            println!("\n🔍 Use it as: Authorization: Bearer {{{{jwt_token}}}}");
        }
        Ok(outcome) => println!("No token generated: {:?}", outcome),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
