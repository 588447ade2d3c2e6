//! Remote resource client
//!
//! [`ResourceClient`] is the set of remote calls the Amazon provider makes.
//! [`AwsResourceClient`] issues them through the AWS SDK.

use crate::context::AwsContext;
use crate::error::classify;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::{debug, error, info};

/// Region where S3 rejects an explicit location constraint
const DEFAULT_S3_REGION: &str = "us-east-1";

/// ARN out of a create response.
///
/// A missing ARN means the object exists remotely but cannot be recorded in
/// the ledger, so teardown will never see it.
fn created_arn(kind: &str, name: &str, arn: Option<&str>) -> Result<String> {
    match arn {
        Some(arn) => Ok(arn.to_string()),
        None => {
            error!(
                kind = %kind,
                name = %name,
                "Created without an ARN in the response, not recorded; delete it by hand"
            );
            Err(anyhow!(
                "{} {} was created but the response carried no ARN; delete it by hand",
                kind,
                name
            ))
        }
    }
}

/// Remote create/bind/destroy calls used by the Amazon provider
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn create_bucket(&self, name: &str) -> Result<()>;

    /// Returns the policy ARN
    async fn create_policy(&self, name: &str, document: &str) -> Result<String>;

    /// Returns the role ARN
    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<String>;

    async fn bind_policy_to_role(&self, policy_arn: &str, role_name: &str) -> Result<()>;

    async fn unbind_policy_from_role(&self, policy_arn: &str, role_name: &str) -> Result<()>;

    async fn destroy_policy(&self, policy_arn: &str) -> Result<()>;

    async fn destroy_role(&self, role_name: &str) -> Result<()>;

    async fn destroy_bucket(&self, name: &str) -> Result<()>;
}

/// S3 and IAM through the AWS SDK
///
/// Destroy and unbind calls treat "not found" answers as success, so a
/// teardown can be repeated after a partial failure.
pub struct AwsResourceClient {
    s3: aws_sdk_s3::Client,
    iam: aws_sdk_iam::Client,
    region: String,
}

impl AwsResourceClient {
    pub async fn new(region: &str) -> Self {
        let ctx = AwsContext::new(region).await;
        Self::from_context(&ctx)
    }

    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            s3: ctx.s3_client(),
            iam: ctx.iam_client(),
            region: ctx.region().to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    async fn empty_bucket(&self, bucket: &str) -> Result<()> {
        let mut continuation_token = None;
        loop {
            let mut request = self.s3.list_objects_v2().bucket(bucket);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.context("Failed to list objects")?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    debug!(bucket = %bucket, key = %key, "Deleting object");
                    self.s3
                        .delete_object()
                        .bucket(bucket)
                        .key(key)
                        .send()
                        .await
                        .context("Failed to delete object")?;
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for AwsResourceClient {
    async fn create_bucket(&self, name: &str) -> Result<()> {
        info!(bucket = %name, region = %self.region, "Creating S3 bucket");

        let mut request = self.s3.create_bucket().bucket(name);
        if self.region != DEFAULT_S3_REGION {
            let configuration = CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build();
            request = request.create_bucket_configuration(configuration);
        }

        request.send().await.context("Failed to create bucket")?;
        Ok(())
    }

    async fn create_policy(&self, name: &str, document: &str) -> Result<String> {
        debug!(policy = %name, "Creating IAM policy");

        let response = self
            .iam
            .create_policy()
            .policy_name(name)
            .policy_document(document)
            .send()
            .await
            .context("Failed to create IAM policy")?;

        created_arn(
            "IAM policy",
            name,
            response.policy().and_then(|policy| policy.arn()),
        )
    }

    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<String> {
        debug!(role = %name, "Creating IAM role");

        let response = self
            .iam
            .create_role()
            .role_name(name)
            .assume_role_policy_document(trust_policy)
            .send()
            .await
            .context("Failed to create IAM role")?;

        created_arn("IAM role", name, response.role().map(|role| role.arn()))
    }

    async fn bind_policy_to_role(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        debug!(policy_arn = %policy_arn, role = %role_name, "Attaching policy to role");

        self.iam
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .context("Failed to attach policy to role")?;
        Ok(())
    }

    async fn unbind_policy_from_role(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        debug!(policy_arn = %policy_arn, role = %role_name, "Detaching policy from role");

        match self
            .iam
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if classify(&e).is_not_found() => {
                debug!(policy_arn = %policy_arn, role = %role_name, "Policy already detached");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to detach policy from role"),
        }
    }

    async fn destroy_policy(&self, policy_arn: &str) -> Result<()> {
        debug!(policy_arn = %policy_arn, "Deleting IAM policy");

        match self.iam.delete_policy().policy_arn(policy_arn).send().await {
            Ok(_) => Ok(()),
            Err(e) if classify(&e).is_not_found() => {
                debug!(policy_arn = %policy_arn, "Policy already deleted");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to delete IAM policy"),
        }
    }

    async fn destroy_role(&self, role_name: &str) -> Result<()> {
        debug!(role = %role_name, "Deleting IAM role");

        match self.iam.delete_role().role_name(role_name).send().await {
            Ok(_) => Ok(()),
            Err(e) if classify(&e).is_not_found() => {
                debug!(role = %role_name, "Role already deleted");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to delete IAM role"),
        }
    }

    async fn destroy_bucket(&self, name: &str) -> Result<()> {
        info!(bucket = %name, "Deleting S3 bucket and contents");

        if let Err(e) = self.empty_bucket(name).await {
            debug!(bucket = %name, error = %e, "Could not empty bucket before deleting it");
        }

        match self.s3.delete_bucket().bucket(name).send().await {
            Ok(_) => Ok(()),
            Err(e) if classify(&e).is_not_found() => {
                debug!(bucket = %name, "Bucket already deleted");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to delete bucket"),
        }
    }
}

#[async_trait]
impl<T: ResourceClient + ?Sized> ResourceClient for std::sync::Arc<T> {
    async fn create_bucket(&self, name: &str) -> Result<()> {
        (**self).create_bucket(name).await
    }

    async fn create_policy(&self, name: &str, document: &str) -> Result<String> {
        (**self).create_policy(name, document).await
    }

    async fn create_role(&self, name: &str, trust_policy: &str) -> Result<String> {
        (**self).create_role(name, trust_policy).await
    }

    async fn bind_policy_to_role(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        (**self).bind_policy_to_role(policy_arn, role_name).await
    }

    async fn unbind_policy_from_role(&self, policy_arn: &str, role_name: &str) -> Result<()> {
        (**self).unbind_policy_from_role(policy_arn, role_name).await
    }

    async fn destroy_policy(&self, policy_arn: &str) -> Result<()> {
        (**self).destroy_policy(policy_arn).await
    }

    async fn destroy_role(&self, role_name: &str) -> Result<()> {
        (**self).destroy_role(role_name).await
    }

    async fn destroy_bucket(&self, name: &str) -> Result<()> {
        (**self).destroy_bucket(name).await
    }
}
