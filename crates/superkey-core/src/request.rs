//! Request types for forging an application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_provider() -> String {
    "amazon".to_string()
}

/// A request to provision the resources an application needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Provider that should forge the request (e.g., "amazon")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Application type, used to derive resource names (e.g., "/insights/platform/cost-management")
    pub application_type: String,

    /// Steps to run, in order
    #[serde(alias = "superkey_steps")]
    pub steps: Vec<Step>,

    /// Request scoped data available to payload substitution
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl CreateRequest {
    pub fn new(application_type: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            provider: default_provider(),
            application_type: application_type.into(),
            steps,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Account number used by the `get_account` substitution
    pub fn account(&self) -> Option<&str> {
        self.extra.get("account").map(String::as_str)
    }

    /// First recognized step kind that appears more than once
    pub fn duplicate_step(&self) -> Option<StepKind> {
        let mut seen = Vec::new();
        for kind in self.steps.iter().filter_map(Step::kind) {
            if seen.contains(&kind) {
                return Some(kind);
            }
            seen.push(kind);
        }
        None
    }
}

/// One unit of work inside a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step name (e.g., "s3", "policy", "role", "bind_role")
    pub name: String,

    /// Vendor specific resource definition, possibly containing placeholders
    #[serde(default)]
    pub payload: String,

    /// Placeholder token -> where its value comes from
    #[serde(default)]
    pub substitutions: BTreeMap<String, SubstitutionSource>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: String::new(),
            substitutions: BTreeMap::new(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_substitution(
        mut self,
        placeholder: impl Into<String>,
        source: SubstitutionSource,
    ) -> Self {
        self.substitutions.insert(placeholder.into(), source);
        self
    }

    /// Recognized kind of this step, `None` for names no provider handles yet
    pub fn kind(&self) -> Option<StepKind> {
        StepKind::from_name(&self.name)
    }
}

/// The closed set of step kinds a provider knows how to forge and tear down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Storage bucket
    Bucket,
    /// Access policy
    Policy,
    /// Assumable role
    Role,
    /// Policy attached to role
    BindRole,
}

impl StepKind {
    /// Every kind in creation (dependency) order.
    ///
    /// Teardown walks this list backwards.
    pub const ALL: [StepKind; 4] = [
        StepKind::Bucket,
        StepKind::Policy,
        StepKind::Role,
        StepKind::BindRole,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "s3" | "bucket" => Some(StepKind::Bucket),
            "policy" => Some(StepKind::Policy),
            "role" => Some(StepKind::Role),
            "bind_role" | "bind" => Some(StepKind::BindRole),
            _ => None,
        }
    }

    /// Label used inside generated resource names, `None` for kinds that own no resource
    pub fn resource_label(&self) -> Option<&'static str> {
        match self {
            StepKind::Bucket => Some("bucket"),
            StepKind::Policy => Some("policy"),
            StepKind::Role => Some("role"),
            StepKind::BindRole => None,
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Bucket => write!(f, "bucket"),
            StepKind::Policy => write!(f, "policy"),
            StepKind::Role => write!(f, "role"),
            StepKind::BindRole => write!(f, "bind_role"),
        }
    }
}

/// Where a placeholder's replacement value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubstitutionSource {
    /// The `account` entry of the request's extra data
    Account,
    /// The recorded output of a prior step
    StepOutput(StepKind),
    /// A source this crate does not know how to resolve
    Unknown(String),
}

impl From<String> for SubstitutionSource {
    fn from(value: String) -> Self {
        if value == "get_account" {
            return SubstitutionSource::Account;
        }
        match StepKind::from_name(&value) {
            Some(kind) => SubstitutionSource::StepOutput(kind),
            None => SubstitutionSource::Unknown(value),
        }
    }
}

impl From<&str> for SubstitutionSource {
    fn from(value: &str) -> Self {
        SubstitutionSource::from(value.to_string())
    }
}

impl From<SubstitutionSource> for String {
    fn from(source: SubstitutionSource) -> Self {
        match source {
            SubstitutionSource::Account => "get_account".to_string(),
            SubstitutionSource::StepOutput(StepKind::Bucket) => "s3".to_string(),
            SubstitutionSource::StepOutput(kind) => kind.to_string(),
            SubstitutionSource::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for SubstitutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from(self.clone()))
    }
}
