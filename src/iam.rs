//! IAM trust-policy document model.
//!
//! Expresses, as a structured permission document, exactly which
//! authenticated principals may open a database connection as a given
//! database role. Documents are built fresh per reconciliation and handed to
//! the external authorization system in its wire format; field names and
//! nesting must be reproduced bit-for-bit for compatibility.

use serde::{Deserialize, Serialize};

/// Trust domain suffix of derived principal keys, e.g. `*:alice@lunar.app`.
pub const DEFAULT_TRUST_DOMAIN: &str = "lunar.app";

/// The database connect action granted by every statement this controller
/// writes.
pub const CONNECT_ACTION: &str = "rds-db:connect";

/// A managed policy as the external authorization system tracks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub current_version_id: String,
    pub document: PolicyDocument,
}

/// In-memory, serializable permission document addressable by principal name.
///
/// Statements keep insertion order; order carries no semantic weight beyond
/// document readability. Single-owner, single-threaded use per instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(rename = "Statement", default, skip_serializing_if = "Vec::is_empty")]
    pub statement: Vec<StatementEntry>,

    /// Deployment trust domain, fixed at construction. Not part of the wire
    /// form; deserialized documents get the deployment default back.
    #[serde(skip, default = "default_trust_domain")]
    trust_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StatementEntry {
    #[serde(rename = "Effect", default, skip_serializing_if = "String::is_empty")]
    pub effect: String,

    #[serde(rename = "Action", default, skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<String>,

    #[serde(rename = "Resource", default, skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<String>,

    #[serde(rename = "Condition", default, skip_serializing_if = "Condition::is_empty")]
    pub condition: Condition,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Condition {
    #[serde(rename = "StringLike", default, skip_serializing_if = "UserId::is_empty")]
    pub string_like: UserId,
}

impl Condition {
    fn is_empty(&self) -> bool {
        self.string_like.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserId {
    #[serde(rename = "aws:userid", default, skip_serializing_if = "String::is_empty")]
    pub aws_user_id: String,
}

impl UserId {
    fn is_empty(&self) -> bool {
        self.aws_user_id.is_empty()
    }
}

fn default_trust_domain() -> String {
    DEFAULT_TRUST_DOMAIN.to_string()
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: String::new(),
            statement: Vec::new(),
            trust_domain: default_trust_domain(),
        }
    }
}

impl PolicyDocument {
    /// New empty document with the given format-version tag.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    /// Like [`PolicyDocument::new`], for deployments with a non-default
    /// trust domain.
    pub fn with_trust_domain(version: impl Into<String>, trust_domain: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            statement: Vec::new(),
            trust_domain: trust_domain.into(),
        }
    }

    /// Derived principal key correlating a statement with a principal name.
    pub fn aws_user_id(&self, username: &str) -> String {
        format!("*:{}@{}", username, self.trust_domain)
    }

    /// Append an allow statement granting the connect action to `username`.
    ///
    /// No uniqueness check is made: repeated calls with the same arguments
    /// append duplicate statements. Inputs are treated as opaque strings;
    /// validation belongs to the caller.
    pub fn add(&mut self, region: &str, account_id: &str, role_prefix: &str, username: &str) {
        let entry = StatementEntry {
            effect: "Allow".to_string(),
            action: vec![CONNECT_ACTION.to_string()],
            resource: vec![format!(
                "arn:aws:rds-db:{}:{}:dbuser:*/{}{}",
                region, account_id, role_prefix, username
            )],
            condition: Condition {
                string_like: UserId {
                    aws_user_id: self.aws_user_id(username),
                },
            },
        };
        self.statement.push(entry);
    }

    /// Remove every statement whose condition matches `username`, keeping
    /// the relative order of the rest.
    pub fn remove(&mut self, username: &str) {
        let aws_user_id = self.aws_user_id(username);
        self.statement
            .retain(|s| s.condition.string_like.aws_user_id != aws_user_id);
    }

    /// Whether at least one statement's condition matches `username`.
    pub fn exists(&self, username: &str) -> bool {
        let aws_user_id = self.aws_user_id(username);
        self.statement
            .iter()
            .any(|s| s.condition.string_like.aws_user_id == aws_user_id)
    }

    pub fn count(&self) -> usize {
        self.statement.len()
    }
}
