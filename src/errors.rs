use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GrantError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(perigee::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(perigee::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(perigee::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(perigee::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("no credentials for host '{0}'")]
    #[diagnostic(
        code(perigee::missing_credentials),
        help("Add a [[credentials]] entry for this host to the configuration file")
    )]
    MissingCredentials(String),

    #[error("connect to {target}: {source}")]
    #[diagnostic(code(perigee::connect))]
    Connect {
        /// Redacted connection string of the failed attempt.
        target: String,
        #[source]
        source: Box<GrantError>,
    },

    #[error("resolve access requests: {source}")]
    #[diagnostic(code(perigee::resolve))]
    Resolve {
        #[source]
        source: Box<GrantError>,
    },

    #[error("{0}")]
    #[diagnostic(code(perigee::aggregate))]
    Aggregate(ErrorSet),

    #[error("{0}")]
    #[diagnostic(code(perigee::other))]
    Other(String),
}

/// Ordered collection of per-scope failures accumulated across a run.
///
/// Multi-host operations succeed partially as a matter of course, so failures
/// are kept as inspectable (scope, error) pairs rather than folded into a
/// single opaque chain. Scopes are host identifiers for connection and
/// synchronization failures and spec labels for resolution failures.
#[derive(Debug, Default)]
pub struct ErrorSet {
    entries: Vec<ScopedError>,
}

/// One failure labeled with the scope it occurred in.
#[derive(Debug)]
pub struct ScopedError {
    pub scope: String,
    pub error: GrantError,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: impl Into<String>, error: GrantError) {
        self.entries.push(ScopedError {
            scope: scope.into(),
            error,
        });
    }

    /// Append all of `other`'s entries, preserving both relative orders.
    pub fn merge(&mut self, other: ErrorSet) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ScopedError] {
        &self.entries
    }

    /// Collapse into a single result: an empty set is success, anything else
    /// becomes one aggregated error naming every failing scope.
    pub fn into_result(self) -> Result<(), GrantError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(GrantError::Aggregate(self))
        }
    }
}

impl fmt::Display for ScopedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.error)
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
