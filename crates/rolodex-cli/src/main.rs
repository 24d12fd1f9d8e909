//! Rolodex CLI - Operator command-line interface
//!
//! Usage:
//!   rolodex hash-password [password]
//!   rolodex token issue <subject> [--ttl-minutes N]
//!   rolodex token inspect <token>
//!   rolodex check-config [--config path]

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use rolodex_auth::{hash_password_with_config, PasswordConfig, TokenConfig, TokenService};
use rolodex_core::{AppConfig, StorageBackend};
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rolodex")]
#[command(about = "Rolodex operator tools")]
#[command(version)]
struct Cli {
    /// TOML config file; environment variables override it
    #[arg(long, global = true, env = "ROLODEX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password with the configured Argon2 costs
    HashPassword {
        /// Password to hash; read from stdin when omitted
        password: Option<String>,
    },
    /// Issue or inspect access tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Load and validate configuration
    CheckConfig,
}

#[derive(Subcommand)]
enum TokenAction {
    /// Sign a token for a subject
    Issue {
        subject: String,
        /// Lifetime in minutes, defaults to the configured TTL
        #[arg(long)]
        ttl_minutes: Option<u32>,
    },
    /// Validate a token and print its claims
    Inspect { token: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::HashPassword { password } => {
            let password = match password {
                Some(password) => password,
                None => read_password_from_stdin()?,
            };
            let password_config = PasswordConfig::from(&config.auth);
            // Argon2 is CPU-bound
            let hash = tokio::task::spawn_blocking(move || {
                hash_password_with_config(&password, &password_config)
            })
            .await??;
            println!("{hash}");
        }
        Commands::Token { action } => {
            config.validate()?;
            let service = TokenService::new(TokenConfig::from(&config.auth));

            match action {
                TokenAction::Issue {
                    subject,
                    ttl_minutes,
                } => {
                    let ttl = match ttl_minutes {
                        Some(minutes) => Duration::minutes(i64::from(minutes)),
                        None => service.ttl(),
                    };
                    let signed = service.issue(&subject, ttl)?;
                    println!("{}", signed.token);
                    tracing::info!(subject = %subject, expires_at = %signed.expires_at, "token issued");
                }
                TokenAction::Inspect { token } => {
                    let report = inspect_token(&service, token.trim(), Utc::now())?;
                    println!("{report}");
                }
            }
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!("{}", describe_config(&config));
        }
    }

    Ok(())
}

fn read_password_from_stdin() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!password.is_empty(), "password must not be empty");
    Ok(password)
}

/// Describe a token, or fail with the reason it is not accepted
fn inspect_token(service: &TokenService, token: &str, now: DateTime<Utc>) -> anyhow::Result<String> {
    let claims = service
        .decode_claims(token)
        .map_err(|e| anyhow::anyhow!("token rejected: {}", e.reason()))?;

    let status = match service.validate_at(token, now) {
        Ok(_) => "valid",
        Err(e) => e.reason(),
    };

    let timestamp = |secs: i64| {
        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| secs.to_string())
    };

    Ok(format!(
        "subject:    {}\nissuer:     {}\nissued_at:  {}\nexpires_at: {}\nstatus:     {}",
        claims.sub,
        claims.iss,
        timestamp(claims.iat),
        timestamp(claims.exp),
        status
    ))
}

/// Non-secret summary of a loaded configuration
fn describe_config(config: &AppConfig) -> String {
    let backend = match config.database.backend {
        StorageBackend::Memory => "memory",
        StorageBackend::Postgres => "postgres",
    };

    format!(
        "listen:     {}:{}\nstorage:    {}\ntoken_ttl:  {} minutes\nissuer:     {}\nlog_level:  {}\nconfig OK",
        config.server.host,
        config.server.port,
        backend,
        config.auth.token_ttl_minutes,
        config.auth.issuer,
        config.logging.level
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn service() -> TokenService {
        TokenService::new(TokenConfig {
            secret: "cli-test-secret".to_string(),
            ttl: Duration::minutes(30),
            issuer: "rolodex".to_string(),
        })
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_token_issue() {
        let cli = Cli::parse_from(["rolodex", "token", "issue", "alice", "--ttl-minutes", "5"]);
        match cli.command {
            Commands::Token {
                action:
                    TokenAction::Issue {
                        subject,
                        ttl_minutes,
                    },
            } => {
                assert_eq!(subject, "alice");
                assert_eq!(ttl_minutes, Some(5));
            }
            _ => panic!("expected token issue"),
        }
    }

    #[test]
    fn test_inspect_valid_and_expired() {
        let service = service();
        let now = Utc::now();
        let token = service
            .issue_at("alice", Duration::minutes(30), now)
            .unwrap()
            .token;

        let report = inspect_token(&service, &token, now).unwrap();
        assert!(report.contains("subject:    alice"));
        assert!(report.contains("status:     valid"));

        let later = now + Duration::minutes(31);
        let report = inspect_token(&service, &token, later).unwrap();
        assert!(report.contains("status:     expired"));
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let err = inspect_token(&service(), "garbage", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_describe_config_hides_secret() {
        let config = AppConfig::default();
        let summary = describe_config(&config);
        assert!(summary.contains("8081"));
        assert!(!summary.contains(&config.auth.signing_secret));
    }
}
