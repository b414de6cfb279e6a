//! hmacsign - send one HMAC-signed HTTP request.
//!
//! # Usage
//!
//! ```text
//! HMAC_KEY_ID=app HMAC_SECRET=s3cr3t hmacsign POST https://api.local/items '{"a":1}'
//! HMAC_KEY_ID=app HMAC_SECRET=s3cr3t hmacsign --signed-uri GET https://api.local/items
//! ```
//!
//! The response status goes to stderr and the body to stdout. With
//! `--signed-uri` nothing is sent; the signed URI is printed instead.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HMAC_KEY_ID` | *(required)* | Key identifier sent with the request |
//! | `HMAC_SECRET` | *(required)* | Shared secret |
//! | `HMAC_SESSION` | `false` | Use a session-capable engine (handshake first) |
//! | `HMAC_MODE` | `header` | `header` or `uri` signing for single-shot requests |
//! | `HMAC_STREAM` | `false` | Stream the response body (skips verification) |
//! | `HMAC_SESSION_EXPIRED_HINT` | `HMAC session expired` | Hint for session clients |
//! | `HMAC_SESSION_REQUIRED_HINT` | `server requires HMAC session` | Hint for single-shot clients |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::io::Write;

use anyhow::{Context, Result, bail};
use hmacsign_auth::{CryptoEngine, HmacSha256Engine, HmacSha256SessionEngine};
use hmacsign_client::{ClientRequest, HmacHttpClient, ReqwestTransport};
use hmacsign_core::{HmacClientConfig, KeyId};
use http::Method;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: hmacsign [--signed-uri] <METHOD> <URL> [BODY]";

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn env_bool(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

/// Parsed command line.
#[derive(Debug)]
struct Args {
    signed_uri_only: bool,
    method: Method,
    url: String,
    body: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut signed_uri_only = false;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--signed-uri" => signed_uri_only = true,
            "-h" | "--help" => bail!(USAGE),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(method), Some(url)) = (positional.next(), positional.next()) else {
        bail!(USAGE);
    };
    let body = positional.next();
    if positional.next().is_some() {
        bail!(USAGE);
    }

    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method: {method}"))?;

    Ok(Args {
        signed_uri_only,
        method,
        url,
        body,
    })
}

fn build_engine(session: bool) -> Result<Box<dyn CryptoEngine>> {
    let key_id = KeyId::new(required_env("HMAC_KEY_ID")?);
    let secret = required_env("HMAC_SECRET")?;
    Ok(if session {
        Box::new(HmacSha256SessionEngine::new(key_id, secret))
    } else {
        Box::new(HmacSha256Engine::new(key_id, secret))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = HmacClientConfig::from_env();
    init_tracing(&config.log_level)?;

    let args = parse_args(std::env::args().skip(1))?;
    let session = env_bool("HMAC_SESSION");

    let mut request = ClientRequest::parse(args.method, &args.url)
        .with_context(|| format!("invalid URL: {}", args.url))?;
    if let Some(body) = args.body {
        request.set_body(body);
    }

    let transport = ReqwestTransport::default().streaming(env_bool("HMAC_STREAM"));
    let mut client = HmacHttpClient::with_config(transport, config);
    client.set_engine(build_engine(session)?);

    if args.signed_uri_only {
        let uri = client.signed_uri(&mut request)?;
        println!("{uri}");
        return Ok(());
    }

    info!(
        method = %request.method(),
        url = %args.url,
        mode = %client.signing_mode(),
        session,
        "sending signed request"
    );

    let response = client.send(request).await?;
    eprintln!("{}", response.status());

    let body = response
        .into_bytes()
        .await
        .context("failed to read response body")?;
    std::io::stdout()
        .write_all(&body)
        .context("failed to write response body")?;

    Ok(())
}
