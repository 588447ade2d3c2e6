//! Amazon provider implementation

use crate::client::{AwsResourceClient, ResourceClient};
use async_trait::async_trait;
use std::sync::Arc;
use superkey_core::{
    BindRecord, CreateRequest, ForgeFailure, ForgedApplication, ProviderSettings, Result,
    RoleRecord, Step, StepKind, StepOutput, StepsCompleted, SuperKeyError, SuperKeyProvider,
    resource_name, short_name, substitute,
};
use tracing::{error, info, warn};

pub const PROVIDER_NAME: &str = "amazon";

/// Amazon provider
pub struct AmazonProvider<C = AwsResourceClient> {
    client: C,
    settings: ProviderSettings,
}

impl<C: ResourceClient> AmazonProvider<C> {
    pub fn new(client: C, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn resource_name(&self, application: &ForgedApplication, label: &str) -> String {
        let short = short_name(
            &self.settings.name_prefix,
            &application.request.application_type,
        );
        resource_name(&short, label, &application.guid)
    }

    fn payload(&self, step: &Step, application: &ForgedApplication) -> Result<String> {
        substitute(
            &step.payload,
            application,
            &step.substitutions,
            self.settings.unresolved_substitutions,
        )
    }

    /// Run one step against AWS and return what it produced
    async fn apply(
        &self,
        kind: StepKind,
        step: &Step,
        application: &ForgedApplication,
    ) -> Result<StepOutput> {
        let failed = |resource: &str| {
            let resource = resource.to_string();
            move |source| SuperKeyError::StepFailed {
                step: kind,
                resource,
                source,
            }
        };

        match kind {
            StepKind::Bucket => {
                let name = self.resource_name(application, "bucket");
                info!(bucket = %name, "Creating S3 bucket");

                self.client
                    .create_bucket(&name)
                    .await
                    .map_err(failed(&name))?;

                info!(bucket = %name, "Created S3 bucket");
                Ok(StepOutput::Bucket { name })
            }
            StepKind::Policy => {
                let name = self.resource_name(application, "policy");
                let document = self.payload(step, application)?;
                info!(policy = %name, "Creating policy");

                let arn = self
                    .client
                    .create_policy(&name, &document)
                    .await
                    .map_err(failed(&name))?;

                info!(policy = %name, arn = %arn, "Created policy");
                Ok(StepOutput::Policy { arn })
            }
            StepKind::Role => {
                let name = self.resource_name(application, "role");
                let trust_policy = self.payload(step, application)?;
                info!(role = %name, "Creating role");

                let arn = self
                    .client
                    .create_role(&name, &trust_policy)
                    .await
                    .map_err(failed(&name))?;

                info!(role = %name, arn = %arn, "Created role");
                Ok(StepOutput::Role(RoleRecord { name, arn }))
            }
            StepKind::BindRole => {
                let completed = &application.steps_completed;
                let missing = |requires| SuperKeyError::MissingDependency {
                    step: kind,
                    requires,
                };
                let policy_arn = completed
                    .output(StepKind::Policy)
                    .ok_or_else(|| missing(StepKind::Policy))?;
                let role_name = completed
                    .output(StepKind::Role)
                    .ok_or_else(|| missing(StepKind::Role))?;
                info!(role = %role_name, policy_arn = %policy_arn, "Binding policy to role");

                self.client
                    .bind_policy_to_role(policy_arn, role_name)
                    .await
                    .map_err(failed(role_name))?;

                info!(role = %role_name, policy_arn = %policy_arn, "Bound policy to role");
                Ok(StepOutput::BindRole(BindRecord {
                    policy_arn: policy_arn.to_string(),
                    role_name: role_name.to_string(),
                }))
            }
        }
    }

    /// Undo one completed step. Does nothing if the step is not recorded.
    async fn compensate(&self, kind: StepKind, completed: &StepsCompleted) -> Result<()> {
        let failed = |resource: &str| {
            let resource = resource.to_string();
            move |source| SuperKeyError::CompensationFailed {
                step: kind,
                resource,
                source,
            }
        };

        match kind {
            StepKind::BindRole => {
                let Some(bind) = &completed.bind_role else {
                    return Ok(());
                };
                self.client
                    .unbind_policy_from_role(&bind.policy_arn, &bind.role_name)
                    .await
                    .map_err(failed(&bind.role_name))?;
                info!(role = %bind.role_name, policy_arn = %bind.policy_arn, "Unbound policy from role");
            }
            StepKind::Role => {
                let Some(role) = &completed.role else {
                    return Ok(());
                };
                self.client
                    .destroy_role(&role.name)
                    .await
                    .map_err(failed(&role.name))?;
                info!(role = %role.name, "Destroyed role");
            }
            StepKind::Policy => {
                let Some(arn) = &completed.policy else {
                    return Ok(());
                };
                self.client
                    .destroy_policy(arn)
                    .await
                    .map_err(failed(arn))?;
                info!(policy_arn = %arn, "Destroyed policy");
            }
            StepKind::Bucket => {
                let Some(bucket) = &completed.bucket else {
                    return Ok(());
                };
                self.client
                    .destroy_bucket(bucket)
                    .await
                    .map_err(failed(bucket))?;
                info!(bucket = %bucket, "Destroyed S3 bucket");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<C: ResourceClient> SuperKeyProvider for AmazonProvider<C> {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn forge_application(
        &self,
        request: Arc<CreateRequest>,
    ) -> std::result::Result<ForgedApplication, ForgeFailure> {
        let mut application =
            ForgedApplication::new(Arc::clone(&request), self.settings.id_source.generate_id());

        info!(
            guid = %application.guid,
            application_type = %request.application_type,
            steps = request.steps.len(),
            "Forging application"
        );

        if let Some(kind) = request.duplicate_step() {
            return Err(ForgeFailure::new(
                application,
                SuperKeyError::DuplicateStep(kind),
            ));
        }

        for step in &request.steps {
            let Some(kind) = step.kind() else {
                warn!(step = %step.name, "Step not implemented by the amazon provider, skipping");
                continue;
            };

            match self.apply(kind, step, &application).await {
                Ok(output) => application.mark_completed(output),
                Err(e) => {
                    error!(
                        step = %kind,
                        guid = %application.guid,
                        error = %e,
                        "Step failed, leaving partial application for teardown"
                    );
                    return Err(ForgeFailure::new(application, e));
                }
            }
        }

        let username = application.steps_completed.role_arn().map(str::to_string);
        application.create_payload(username, None, None);

        info!(guid = %application.guid, "Forged application");
        Ok(application)
    }

    async fn tear_down(&self, application: &mut ForgedApplication) -> Vec<SuperKeyError> {
        let mut errors = Vec::new();

        info!(
            guid = %application.guid,
            steps = application.steps_completed.len(),
            "Tearing down application"
        );

        for kind in StepKind::ALL.into_iter().rev() {
            if !application.steps_completed.is_completed(kind) {
                continue;
            }

            match self.compensate(kind, &application.steps_completed).await {
                Ok(()) => application.steps_completed.clear(kind),
                Err(e) => {
                    warn!(step = %kind, error = %e, "Compensation failed");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            info!(guid = %application.guid, "Tore down application");
        } else {
            warn!(
                guid = %application.guid,
                failures = errors.len(),
                "Teardown finished with failures, resources may be orphaned"
            );
        }

        errors
    }
}
