//! Step ledger for a single forge attempt
//!
//! A [`ForgedApplication`] records which steps of a request finished and
//! what each one produced. It is created by a provider's forge operation,
//! handed back to the caller, and later passed to teardown.

use crate::request::{CreateRequest, StepKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The record of one forge attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgedApplication {
    /// The request being forged
    pub request: Arc<CreateRequest>,

    /// Short random id that makes resource names unique
    pub guid: String,

    /// Outputs of the steps that completed
    pub steps_completed: StepsCompleted,

    /// Identity handed to the consumer once every step succeeded
    pub result_username: Option<String>,
    pub result_password: Option<String>,
    pub result_extra: Option<String>,

    /// When the forge attempt started
    pub created_at: DateTime<Utc>,
}

impl ForgedApplication {
    pub fn new(request: Arc<CreateRequest>, guid: impl Into<String>) -> Self {
        Self {
            request,
            guid: guid.into(),
            steps_completed: StepsCompleted::default(),
            result_username: None,
            result_password: None,
            result_extra: None,
            created_at: Utc::now(),
        }
    }

    /// Record a step whose remote call succeeded
    pub fn mark_completed(&mut self, output: StepOutput) {
        self.steps_completed.record(output);
    }

    /// Set the identity fields handed to the consumer
    pub fn create_payload(
        &mut self,
        username: Option<String>,
        password: Option<String>,
        extra: Option<String>,
    ) {
        self.result_username = username;
        self.result_password = password;
        self.result_extra = extra;
    }
}

/// Output of one completed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Bucket { name: String },
    Policy { arn: String },
    Role(RoleRecord),
    BindRole(BindRecord),
}

impl StepOutput {
    pub fn kind(&self) -> StepKind {
        match self {
            StepOutput::Bucket { .. } => StepKind::Bucket,
            StepOutput::Policy { .. } => StepKind::Policy,
            StepOutput::Role(_) => StepKind::Role,
            StepOutput::BindRole(_) => StepKind::BindRole,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRecord {
    pub policy_arn: String,
    pub role_name: String,
}

/// One slot per step kind; a filled slot means the step completed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepsCompleted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_role: Option<BindRecord>,
}

impl StepsCompleted {
    pub fn record(&mut self, output: StepOutput) {
        match output {
            StepOutput::Bucket { name } => self.bucket = Some(name),
            StepOutput::Policy { arn } => self.policy = Some(arn),
            StepOutput::Role(role) => self.role = Some(role),
            StepOutput::BindRole(bind) => self.bind_role = Some(bind),
        }
    }

    pub fn is_completed(&self, kind: StepKind) -> bool {
        match kind {
            StepKind::Bucket => self.bucket.is_some(),
            StepKind::Policy => self.policy.is_some(),
            StepKind::Role => self.role.is_some(),
            StepKind::BindRole => self.bind_role.is_some(),
        }
    }

    /// The primary output of a step: bucket name, policy ARN or role name.
    ///
    /// A bind has no output of its own.
    pub fn output(&self, kind: StepKind) -> Option<&str> {
        match kind {
            StepKind::Bucket => self.bucket.as_deref(),
            StepKind::Policy => self.policy.as_deref(),
            StepKind::Role => self.role.as_ref().map(|r| r.name.as_str()),
            StepKind::BindRole => None,
        }
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.arn.as_str())
    }

    /// Forget a step after its resource was destroyed
    pub fn clear(&mut self, kind: StepKind) {
        match kind {
            StepKind::Bucket => self.bucket = None,
            StepKind::Policy => self.policy = None,
            StepKind::Role => self.role = None,
            StepKind::BindRole => self.bind_role = None,
        }
    }

    /// Completed kinds in creation order
    pub fn kinds(&self) -> Vec<StepKind> {
        StepKind::ALL
            .into_iter()
            .filter(|kind| self.is_completed(*kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.kinds().len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}
