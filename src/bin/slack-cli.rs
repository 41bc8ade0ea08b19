use std::io;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use slack_web_client::facets::{AccessLogsOptions, BillableInfoOptions, IntegrationLogsOptions};
use slack_web_client::{
    CallResult, Dispatcher, HttpTransport, Params, PendingCall, SLACK_API_BASE_URL, WebClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "slack-cli",
    version,
    about = "Small async CLI for calling the Slack Web API"
)]
struct Cli {
    /// Base URL for the API.
    #[arg(long, env = "SLACK_API_BASE_URL", default_value = SLACK_API_BASE_URL)]
    base_url: String,

    /// Token sent as `Authorization: Bearer <token>`.
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Call any API method by identifier (for example: `users.info`).
    Call(CallArgs),
    /// Methods in the `team` namespace.
    #[command(subcommand)]
    Team(TeamCommand),
}

#[derive(Debug, Args)]
struct CallArgs {
    /// API method identifier.
    method: String,

    /// String parameter in form key=value. Repeat as needed.
    #[arg(long = "param", value_name = "KEY=VALUE")]
    param: Vec<String>,

    /// JSON parameter in form key=<json>. Repeat as needed.
    #[arg(long = "json-param", value_name = "KEY=JSON")]
    json_param: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum TeamCommand {
    /// Get information about the current team.
    Info,
    /// Get the access logs for the current team.
    AccessLogs {
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        before: Option<i64>,
    },
    /// Get billable users information for the current team.
    BillableInfo {
        #[arg(long)]
        user: Option<String>,
    },
    /// Get the integration logs for the current team.
    IntegrationLogs {
        #[arg(long)]
        service_id: Option<String>,
        #[arg(long)]
        app_id: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        change_type: Option<String>,
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        page: Option<u32>,
    },
}

/// Entry point for the async CLI.
///
/// Parses command-line arguments, builds the client, dispatches subcommands,
/// and prints JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut transport = HttpTransport::new(&cli.base_url)
        .with_context(|| format!("failed to create client with base URL '{}'", cli.base_url))?
        .with_user_agent(concat!("slack-cli/", env!("CARGO_PKG_VERSION")));

    if let Some(token) = &cli.token {
        transport = transport.with_token(token.clone());
    }

    if let Some(secs) = cli.timeout_secs {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    let client = WebClient::new(Dispatcher::new(transport));

    let output = match &cli.command {
        Command::Call(args) => call_method(&client, args)
            .await
            .with_context(|| format!("call failed: '{}'", args.method))?,
        Command::Team(command) => call_team(&client, command)
            .await
            .context("team call failed")?,
    };

    print_json(&Value::Object(output), cli.compact).context("failed to print JSON output")?;
    Ok(())
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Calls an arbitrary method with parameters parsed from CLI args.
async fn call_method(client: &WebClient, args: &CallArgs) -> Result<CallResult> {
    let mut options = Params::new();
    for (key, value) in parse_pairs(&args.param, "--param")? {
        options.insert(key, Value::String(value));
    }
    for (key, raw) in parse_pairs(&args.json_param, "--json-param")? {
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON for --json-param '{key}'"))?;
        options.insert(key, value);
    }

    let options = (!options.is_empty()).then_some(options);
    let result = client.call_async(&args.method, None, options).await?;
    Ok(result)
}

async fn call_team(client: &WebClient, command: &TeamCommand) -> Result<CallResult> {
    let team = client.team();
    let pending: PendingCall = match command {
        TeamCommand::Info => team.info()?,
        TeamCommand::AccessLogs {
            count,
            page,
            before,
        } => team.access_logs(&AccessLogsOptions {
            count: *count,
            page: *page,
            before: *before,
        })?,
        TeamCommand::BillableInfo { user } => {
            team.billable_info(&BillableInfoOptions { user: user.clone() })?
        }
        TeamCommand::IntegrationLogs {
            service_id,
            app_id,
            user,
            change_type,
            count,
            page,
        } => team.integration_logs(&IntegrationLogsOptions {
            service_id: service_id.clone(),
            app_id: app_id.clone(),
            user: user.clone(),
            change_type: change_type.clone(),
            count: *count,
            page: *page,
        })?,
    };
    Ok(pending.await?)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
///
/// Returns an error when a value does not include `=` or has an empty key.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    println!("{}", rendered.context("Failed to render JSON")?);
    Ok(())
}
