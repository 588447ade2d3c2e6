//! Command test helpers: a registry backed by a client that records calls

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use superkey_aws::{AmazonProvider, ResourceClient};
use superkey_core::{
    CreateRequest, FixedIdSource, ForgedApplication, ProviderRegistry, ProviderSettings, Step,
    StepKind, SubstitutionSource,
};

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

#[derive(Default)]
pub struct RecordingClient {
    ops: Mutex<Vec<Op>>,
    failing: Mutex<HashSet<Op>>,
}

impl RecordingClient {
    pub fn failing(ops: &[Op]) -> Self {
        let client = Self::default();
        client.fail(ops);
        client
    }

    pub fn fail(&self, ops: &[Op]) {
        self.failing.lock().unwrap().extend(ops.iter().copied());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: Op) -> Result<()> {
        self.ops.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(&op) {
            bail!("simulated {:?} failure", op);
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for RecordingClient {
    async fn create_bucket(&self, _name: &str) -> Result<()> {
        self.record(Op::CreateBucket)
    }

    async fn create_policy(&self, name: &str, _document: &str) -> Result<String> {
        self.record(Op::CreatePolicy)?;
        Ok(format!("arn:aws:iam::{}:policy/{}", ACCOUNT, name))
    }

    async fn create_role(&self, name: &str, _trust_policy: &str) -> Result<String> {
        self.record(Op::CreateRole)?;
        Ok(format!("arn:aws:iam::{}:role/{}", ACCOUNT, name))
    }

    async fn bind_policy_to_role(&self, _policy_arn: &str, _role_name: &str) -> Result<()> {
        self.record(Op::Bind)
    }

    async fn unbind_policy_from_role(&self, _policy_arn: &str, _role_name: &str) -> Result<()> {
        self.record(Op::Unbind)
    }

    async fn destroy_policy(&self, _policy_arn: &str) -> Result<()> {
        self.record(Op::DestroyPolicy)
    }

    async fn destroy_role(&self, _role_name: &str) -> Result<()> {
        self.record(Op::DestroyRole)
    }

    async fn destroy_bucket(&self, _name: &str) -> Result<()> {
        self.record(Op::DestroyBucket)
    }
}

/// A registry whose amazon provider talks to `client`
pub fn registry(client: Arc<RecordingClient>) -> ProviderRegistry {
    let settings = ProviderSettings::default().with_id_source(Arc::new(FixedIdSource::new(GUID)));
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(AmazonProvider::new(client, settings)));
    registry
}

/// The four-step cost management request, written to `dir/request.json`
pub fn write_request(dir: &Path) -> PathBuf {
    let request = CreateRequest::new(
        "/insights/platform/cost-management",
        vec![
            Step::new("s3"),
            Step::new("policy")
                .with_payload(r#"{"Resource":["arn:aws:s3:::S3BUCKET/*"]}"#)
                .with_substitution("S3BUCKET", SubstitutionSource::from("s3")),
            Step::new("role")
                .with_payload(r#"{"Principal":{"AWS":"arn:aws:iam::ACCOUNT:root"}}"#)
                .with_substitution("ACCOUNT", SubstitutionSource::Account),
            Step::new("bind_role"),
        ],
    )
    .with_extra("account", ACCOUNT);

    let path = dir.join("request.json");
    std::fs::write(&path, serde_json::to_string_pretty(&request).unwrap()).unwrap();
    path
}

pub fn read_ledger(path: &Path) -> ForgedApplication {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

pub fn completed(path: &Path) -> Vec<StepKind> {
    read_ledger(path).steps_completed.kinds()
}
