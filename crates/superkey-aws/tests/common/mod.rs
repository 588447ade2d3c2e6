//! Test helpers: a resource client that records calls instead of talking to AWS

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use superkey_aws::{AmazonProvider, ResourceClient};
use superkey_core::{CreateRequest, FixedIdSource, ProviderSettings, Step, SubstitutionSource};

pub const GUID: &str = "0123456789abcdef";
pub const ACCOUNT: &str = "123456789012";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateBucket,
    CreatePolicy,
    CreateRole,
    Bind,
    Unbind,
    DestroyPolicy,
    DestroyRole,
    DestroyBucket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Op>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(ops: &[Op]) -> Self {
        let client = Self::default();
        client.fail(ops);
        client
    }

    pub fn fail(&self, ops: &[Op]) {
        self.failing.lock().unwrap().extend(ops.iter().copied());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.calls().into_iter().map(|c| c.op).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: Op, args: &[&str]) -> Result<()> {
        self.calls.lock().unwrap().push(Call {
            op,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        if self.failing.lock().unwrap().contains(&op) {
            bail!("simulated {:?} failure", op);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for RecordingClient {
    async fn create_bucket(&self, name: &str) -> Result<()> {
        self.record(Op::CreateBucket, &[name])
    }

    async fn create_policy(&self, name: &str, document: &str) -> Result<String> {
        self.record(Op::CreatePolicy, &[name, document])?;
        Ok(format!("arn:aws:iam::{}:policy/{}", ACCOUNT, name))
    }

    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<String> {
        self.record(Op::CreateRole, &[name, trust_policy])?;
        Ok(format!("arn:aws:iam::{}:role/{}", ACCOUNT, name))
    }

    async fn bind_policy_to_role(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        self.record(Op::Bind, &[policy_arn, role_name])
    }

    async fn unbind_policy_from_role(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        self.record(Op::Unbind, &[policy_arn, role_name])
    }

    async fn destroy_policy(&self, policy_arn: &str) -> Result<()> {
        self.record(Op::DestroyPolicy, &[policy_arn])
    }

    async fn destroy_role(&self, role_name: &str) -> Result<()> {
        self.record(Op::DestroyRole, &[role_name])
    }

    async fn destroy_bucket(&self, name: &str) -> Result<()> {
        self.record(Op::DestroyBucket, &[name])
    }
}

pub fn provider(client: RecordingClient) -> AmazonProvider<RecordingClient> {
    AmazonProvider::new(client, settings())
}

pub fn shared_provider(client: Arc<RecordingClient>) -> AmazonProvider<Arc<RecordingClient>> {
    AmazonProvider::new(client, settings())
}

pub fn settings() -> ProviderSettings {
    ProviderSettings::default().with_id_source(Arc::new(FixedIdSource::new(GUID)))
}

pub const POLICY_PAYLOAD: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["s3:GetObject"],"Resource":["arn:aws:s3:::S3BUCKET/*"]}]}"#;

pub const ROLE_PAYLOAD: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"AWS":"arn:aws:iam::ACCOUNT:root"},"Action":"sts:AssumeRole"}]}"#;

/// The four-step request the cost management application sends
pub fn full_request() -> CreateRequest {
    CreateRequest::new(
        "/insights/platform/cost-management",
        vec![
            Step::new("s3"),
            Step::new("policy")
                .with_payload(POLICY_PAYLOAD)
                .with_substitution("S3BUCKET", SubstitutionSource::from("s3")),
            Step::new("role")
                .with_payload(ROLE_PAYLOAD)
                .with_substitution("ACCOUNT", SubstitutionSource::Account),
            Step::new("bind_role"),
        ],
    )
    .with_extra("account", ACCOUNT)
}

pub fn bucket_name() -> String {
    format!("redhat-cost-management-bucket-{}", GUID)
}

pub fn policy_name() -> String {
    format!("redhat-cost-management-policy-{}", GUID)
}

pub fn role_name() -> String {
    format!("redhat-cost-management-role-{}", GUID)
}

pub fn policy_arn() -> String {
    format!("arn:aws:iam::{}:policy/{}", ACCOUNT, policy_name())
}

pub fn role_arn() -> String {
    format!("arn:aws:iam::{}:role/{}", ACCOUNT, role_name())
}
