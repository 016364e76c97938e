//! MCP session management.
//!
//! A [`Session`] is one live connection to a database plus the configuration
//! it was opened with. The gateway holds at most one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::store::DocumentStore;

/// Default connect/server-selection timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Connection pool bound handed to the driver.
pub const MAX_POOL_SIZE: u32 = 10;

/// Parameters of a connect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Driver connection string, may carry credentials.
    pub connection_string: String,
    /// Database selected after connecting.
    pub database_name: String,
    /// Connect and server-selection timeout.
    pub timeout: Duration,
    /// Force TLS on the connection.
    pub tls: bool,
    /// Let the driver retry writes once on transient failures.
    pub retry_writes: bool,
}

impl ConnectConfig {
    /// A config with default timeout, TLS on and retry-writes on.
    pub fn new(connection_string: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_name: database_name.into(),
            timeout: DEFAULT_TIMEOUT,
            tls: true,
            retry_writes: true,
        }
    }

    /// Override the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the TLS flag.
    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Override the retry-writes flag.
    pub fn retry_writes(mut self, retry_writes: bool) -> Self {
        self.retry_writes = retry_writes;
        self
    }
}

// Connection strings routinely embed passwords; keep them out of logs.
impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("connection_string", &"<redacted>")
            .field("database_name", &self.database_name)
            .field("timeout", &self.timeout)
            .field("tls", &self.tls)
            .field("retry_writes", &self.retry_writes)
            .finish()
    }
}

/// A live connection to one database.
pub struct Session {
    store: Arc<dyn DocumentStore>,
    database: String,
    server_version: String,
    config: ConnectConfig,
}

impl Session {
    /// Wrap an opened store.
    pub fn new(store: Arc<dyn DocumentStore>, server_version: String, config: ConnectConfig) -> Self {
        Self {
            store,
            database: config.database_name.clone(),
            server_version,
            config,
        }
    }

    /// The store commands run against.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Selected database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Server version reported at connect time.
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// The configuration the session was opened with.
    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("database", &self.database)
            .field("server_version", &self.server_version)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
