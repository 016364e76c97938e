//! MCP server for MongoDB.
//!
//! Run with `mongo-mcp`, then connect through the `connect_to_mongodb` tool,
//! or pass `--uri`/`--database` (or the matching environment variables) to
//! connect at startup.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mongo_mcp::{Command, ConnectConfig, Gateway, McpServer, Payload};
use tracing_subscriber::EnvFilter;

/// MCP server for MongoDB.
///
/// Exposes MongoDB CRUD operations as MCP tools for AI agents.
/// Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "mongo-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Connection string to connect with at startup.
    #[arg(long, value_name = "URI", env = "MONGODB_CONNECTION_STRING", hide_env_values = true)]
    uri: Option<String>,

    /// Database to select at startup. Requires --uri.
    #[arg(long, value_name = "NAME", env = "MONGODB_DATABASE_NAME")]
    database: Option<String>,

    /// Connect and server-selection timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Do not force TLS for the startup connection.
    #[arg(long)]
    no_tls: bool,

    /// Disable retryable writes for the startup connection.
    #[arg(long)]
    no_retry_writes: bool,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    /// Startup connection config, if both the URI and the database are set.
    fn connect_config(&self) -> Option<ConnectConfig> {
        let uri = self.uri.as_ref()?;
        let database = self.database.as_ref()?;
        Some(
            ConnectConfig::new(uri, database)
                .timeout(Duration::from_millis(self.timeout_ms))
                .tls(!self.no_tls)
                .retry_writes(!self.no_retry_writes),
        )
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Set up logging; stdout carries the protocol so logs go to stderr
    let default_level = if args.verbose {
        "mongo_mcp=debug"
    } else {
        "mongo_mcp=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Validate arguments
    if args.timeout_ms == 0 {
        eprintln!("Error: --timeout-ms must be positive");
        std::process::exit(1);
    }

    if args.uri.is_some() != args.database.is_some() {
        eprintln!("Error: --uri and --database must be given together");
        std::process::exit(1);
    }

    let gateway = Arc::new(Gateway::mongo());

    // Best-effort startup connection; the connect tool can retry later
    if let Some(config) = args.connect_config() {
        let envelope = gateway.execute(Command::Connect(config)).await;
        if let Some(Payload::Connected {
            database,
            server_version,
            ..
        }) = envelope.payload()
        {
            tracing::info!(%database, %server_version, "startup connection established");
        } else {
            tracing::warn!(
                message = envelope.message().unwrap_or_default(),
                "startup connection failed, starting disconnected"
            );
        }
    }

    let mut server = McpServer::new(gateway);

    // Run the server
    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
