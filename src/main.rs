use anyhow::{Context, Result, anyhow};
use apiguard::auth::{Credentials, TokenFormat};
use apiguard::config::ClientConfig;
use apiguard::http::{HttpClient, RetryConfig};
use apiguard::validate_input;
use clap::Parser;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// apiguard - JSON API requests with retry and rate-limit handling
///
/// Sends one request, waits out 429 responses, retries connection errors and
/// timeouts with exponential backoff, and prints the decoded JSON response.
///
/// Examples:
///   apiguard request /users/octocat --base-url https://api.github.com --service GitHub
#[derive(Parser, Debug)]
#[command(author, version = env!("APIGUARD_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a request and print the JSON response
    Request(RequestArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum AuthScheme {
    /// Authorization: Bearer <token>
    Bearer,
    /// Authorization: token <token>
    Token,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind {
    /// Any non-empty token
    Any,
    /// Alphanumeric, at least 20 characters
    Coda,
    /// 40 hex characters
    Github,
    /// At least 50 characters
    Google,
}

impl From<TokenKind> for TokenFormat {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Any => TokenFormat::Any,
            TokenKind::Coda => TokenFormat::Coda,
            TokenKind::Github => TokenFormat::GitHub,
            TokenKind::Google => TokenFormat::Google,
        }
    }
}

#[derive(clap::Args, Debug)]
struct RequestArgs {
    /// Path relative to the base URL, or an absolute URL
    #[arg(value_name = "PATH")]
    path: String,

    /// Base URL of the API
    #[arg(long = "base-url", value_name = "URL", default_value = "https://api.github.com")]
    base_url: String,

    /// Service name used in error messages
    #[arg(long, default_value = "API")]
    service: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    method: String,

    /// Query parameter as KEY=VALUE (repeatable)
    #[arg(long = "query", short = 'q', value_name = "KEY=VALUE")]
    query: Vec<String>,

    /// JSON request body
    #[arg(long = "data", short = 'd', value_name = "JSON")]
    data: Option<String>,

    /// Field that must be present in the request body (repeatable)
    #[arg(long = "require", value_name = "FIELD")]
    require: Vec<String>,

    /// API token (also via APIGUARD_TOKEN)
    #[arg(long, env = "APIGUARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// How the token is sent
    #[arg(long = "auth-scheme", value_enum, default_value_t = AuthScheme::Bearer)]
    auth_scheme: AuthScheme,

    /// Expected token format, checked before sending
    #[arg(long = "token-format", value_enum, default_value_t = TokenKind::Any)]
    token_format: TokenKind,

    /// Maximum attempts, the first one included
    #[arg(long = "max-attempts", default_value_t = apiguard::http::MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Delay before the first retry, in seconds
    #[arg(long = "base-delay", default_value_t = apiguard::http::BASE_DELAY_SECS)]
    base_delay: f64,

    /// Upper bound on the backoff delay, in seconds
    #[arg(long = "max-delay", default_value_t = apiguard::http::MAX_DELAY_SECS)]
    max_delay: f64,

    /// Per-attempt timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn parse_query(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("Invalid query parameter '{}', expected KEY=VALUE", pair))
        })
        .collect()
}

async fn request(args: RequestArgs) -> Result<Value> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;
    let query = parse_query(&args.query)?;

    let body = args
        .data
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("Request body is not valid JSON")?;

    if !args.require.is_empty() {
        let required: Vec<&str> = args.require.iter().map(String::as_str).collect();
        validate_input(body.as_ref().unwrap_or(&Value::Null), &required, "request data")?;
    }

    let retry = RetryConfig::new(args.max_attempts, args.base_delay, args.max_delay)?;
    let mut config = ClientConfig::new(args.base_url, args.service)
        .with_retry(retry)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_token_format(args.token_format.into());
    if let Some(token) = args.token.filter(|t| !t.is_empty()) {
        config = config.with_credentials(match args.auth_scheme {
            AuthScheme::Bearer => Credentials::Bearer(token),
            AuthScheme::Token => Credentials::Token(token),
        });
    }

    let client = HttpClient::new(config)?;
    let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let value = client
        .send_json(method, &args.path, &query, body.as_ref())
        .await?;
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Request(args) => {
            let value = request(args).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
