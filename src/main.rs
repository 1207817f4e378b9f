//! CLI entry point for pgwarn.
//!
//! Logs in to the cluster given by `-ip`, lists its protection groups and
//! prints those whose last backup succeeded with warnings.
//!
//! Flags follow the single-dash long form (`-ip 10.0.0.5`, `-username=ops`);
//! the double-dash form works too.
//!
//! Any runtime failure is printed to stdout and the process still exits 0.
//! Only argument errors (handled by clap) produce a non-zero exit code.

use std::ffi::OsString;
use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pgwarn::auth::Credentials;
use pgwarn::client::ClusterClient;

/// Flags that take a value. Go-style parsing always consumes the next
/// token as the value, even when it starts with a hyphen.
const VALUE_FLAGS: [&str; 4] = ["ip", "username", "password", "domain"];

/// Flags without a value that may be written with a single dash.
const SWITCH_FLAGS: [&str; 2] = ["verify-tls", "help"];

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// IP address (or host[:port]) of the cluster.
    #[arg(long, default_value = "0.0.0.0", allow_hyphen_values = true)]
    ip: String,

    /// Username.
    #[arg(long, default_value = "admin", allow_hyphen_values = true)]
    username: String,

    /// Password. May start with a hyphen.
    #[arg(long, default_value = "admin", allow_hyphen_values = true)]
    password: String,

    /// Authentication domain.
    #[arg(long, default_value = "LOCAL", allow_hyphen_values = true)]
    domain: String,

    /// Validate the cluster's TLS certificate. Off by default because
    /// clusters usually present self-signed certificates.
    #[arg(long)]
    verify_tls: bool,
}

/// Rewrites Go-style flags into the form clap parses unambiguously.
///
/// - `-switch` becomes `--switch` for the known switches.
/// - `-flag value` and `--flag value` become `--flag=value` for the
///   value flags, so the value reaches clap verbatim whatever it looks like.
/// - `-flag=value` becomes `--flag=value`.
///
/// Unknown tokens, and everything after `--`, pass through untouched.
fn normalize_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if text == "--" {
            out.push(arg);
            out.extend(args);
            break;
        }
        let Some(rest) = text.strip_prefix("--").or_else(|| text.strip_prefix('-')) else {
            out.push(arg);
            continue;
        };
        let rewritten = match rest.split_once('=') {
            Some((name, _)) if VALUE_FLAGS.contains(&name) || SWITCH_FLAGS.contains(&name) => {
                Some(OsString::from(format!("--{rest}")))
            }
            None if VALUE_FLAGS.contains(&rest) => match args.next() {
                Some(value) => {
                    let mut joined = OsString::from(format!("--{rest}="));
                    joined.push(value);
                    Some(joined)
                }
                // Let clap report the missing value.
                None => Some(OsString::from(format!("--{rest}"))),
            },
            None if SWITCH_FLAGS.contains(&rest) => Some(OsString::from(format!("--{rest}"))),
            _ => None,
        };
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one check against the cluster named on the command line.
async fn run<W: Write>(args: &Cli, out: &mut W) {
    if !args.verify_tls {
        tracing::warn!("TLS certificate validation is disabled");
    }
    let client = ClusterClient::new(&args.ip, args.verify_tls);
    let credentials = Credentials::new(&args.username, &args.password, &args.domain);
    report(client, &credentials, out).await;
}

/// Writes the report, or the error that stopped it, to `out`.
///
/// Every failure ends up as a single line on the same writer as the report;
/// the caller never sees an error.
async fn report<W: Write>(
    client: pgwarn::error::Result<ClusterClient>,
    credentials: &Credentials,
    out: &mut W,
) {
    let result = match client {
        Ok(client) => pgwarn::check_warnings(&client, credentials, out)
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::debug!(error = ?e, "check failed");
        // Nowhere left to report a failure to write the failure.
        let _ = writeln!(out, "{e}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse_from(normalize_flags(std::env::args_os()));
    init_tracing();

    let mut stdout = std::io::stdout().lock();
    run(&args, &mut stdout).await;
}
