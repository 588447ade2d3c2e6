//! Provider trait definition

use crate::error::{ForgeFailure, Result, SuperKeyError};
use crate::ledger::ForgedApplication;
use crate::naming::{IdSource, OsRngIdSource};
use crate::request::CreateRequest;
use crate::template::UnresolvedSubstitution;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Provider abstraction trait
///
/// Each cloud vendor implements this trait. A provider runs a request's
/// steps strictly in order and, on request, compensates for every step
/// recorded in a ledger.
#[async_trait]
pub trait SuperKeyProvider: Send + Sync {
    /// Returns the provider name (e.g., "amazon")
    fn name(&self) -> &str;

    /// Run the request's steps in order.
    ///
    /// Stops at the first failing step and returns the partially populated
    /// ledger inside the [`ForgeFailure`]. Nothing is rolled back here; the
    /// caller should pass the partial ledger to [`SuperKeyProvider::tear_down`].
    async fn forge_application(
        &self,
        request: Arc<CreateRequest>,
    ) -> std::result::Result<ForgedApplication, ForgeFailure>;

    /// Destroy everything recorded in the ledger, newest dependency first.
    ///
    /// Every compensating action is attempted regardless of earlier
    /// failures. Entries are cleared as their resources are destroyed, so
    /// calling this again only retries what is left.
    async fn tear_down(&self, application: &mut ForgedApplication) -> Vec<SuperKeyError>;
}

/// Settings shared by every provider
#[derive(Clone)]
pub struct ProviderSettings {
    /// Prefix for short names (e.g., "redhat")
    pub name_prefix: String,

    /// Policy for placeholders that cannot be resolved
    pub unresolved_substitutions: UnresolvedSubstitution,

    /// Source of ledger guids
    pub id_source: Arc<dyn IdSource>,
}

impl ProviderSettings {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_unresolved_substitutions(mut self, policy: UnresolvedSubstitution) -> Self {
        self.unresolved_substitutions = policy;
        self
    }

    pub fn with_id_source(mut self, id_source: Arc<dyn IdSource>) -> Self {
        self.id_source = id_source;
        self
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name_prefix: "redhat".to_string(),
            unresolved_substitutions: UnresolvedSubstitution::default(),
            id_source: Arc::new(OsRngIdSource),
        }
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("name_prefix", &self.name_prefix)
            .field("unresolved_substitutions", &self.unresolved_substitutions)
            .finish_non_exhaustive()
    }
}

/// Providers indexed by name
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SuperKeyProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn SuperKeyProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn SuperKeyProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| SuperKeyError::ProviderNotFound(name.to_string()))
    }

    /// Provider named by the request
    pub fn for_request(&self, request: &CreateRequest) -> Result<Arc<dyn SuperKeyProvider>> {
        self.get(&request.provider)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
