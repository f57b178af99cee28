use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jwt_mock::{
    decode_claims, env::CLIENT_ID, run, HookOutcome, MockTokenConfig, Overlay, PostmanEnvironment,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jwt-mock")]
#[command(about = "Fabricate placeholder bearer tokens in an exported test environment")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the mock auth hook against an environment file
    Run {
        /// Exported environment JSON, updated in place
        env_file: PathBuf,

        /// Use this client id instead of the one in the file
        #[arg(long)]
        client_id: Option<String>,

        /// Scope claim to embed
        #[arg(long, default_value = jwt_mock::token::SCOPE)]
        scope: String,

        /// Token lifetime in seconds
        #[arg(long, default_value_t = jwt_mock::token::TOKEN_TTL_SECS)]
        ttl: i64,

        /// Report what would happen without writing the file
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a starter environment with demo credentials
    Init {
        env_file: PathBuf,

        #[arg(long, default_value = "Payment Refund API - Dev")]
        name: String,
    },
    /// Print the claims of a mock token
    Inspect { token: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Run {
            env_file,
            client_id,
            scope,
            ttl,
            dry_run,
        } => {
            let mut env = PostmanEnvironment::load(&env_file)
                .with_context(|| format!("failed to load {}", env_file.display()))?;
            let config = MockTokenConfig {
                scope,
                ttl_secs: ttl,
                ..MockTokenConfig::default()
            };
            let outcome = match client_id {
                Some(client_id) => run(&mut Overlay::new(&mut env, CLIENT_ID, client_id), &config),
                None => run(&mut env, &config),
            }
            .context("failed to fabricate token")?;

            match outcome {
                HookOutcome::Aborted(reason) => warn!("Nothing written: {reason}."),
                HookOutcome::Skipped => info!("Kept existing token."),
                HookOutcome::Fabricated(token) if dry_run => {
                    info!("Dry run, not saving.");
                    println!("{token}");
                }
                HookOutcome::Fabricated(token) => {
                    env.save(&env_file)
                        .with_context(|| format!("failed to save {}", env_file.display()))?;
                    info!(path = %env_file.display(), "Saved environment.");
                    println!("{token}");
                }
            }
        }
        Command::Init { env_file, name } => {
            PostmanEnvironment::starter(&name)
                .save(&env_file)
                .with_context(|| format!("failed to write {}", env_file.display()))?;
            info!(path = %env_file.display(), %name, "Wrote starter environment.");
        }
        Command::Inspect { token } => {
            let claims = decode_claims(&token).context("not a mock token")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
    }

    Ok(())
}
