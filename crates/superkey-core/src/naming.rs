//! Resource naming

use rand::RngCore;
use rand::rngs::OsRng;

/// Number of random bytes behind a generated id (16 hex characters)
const ID_BYTES: usize = 8;

/// Derive the short, namespaced label for an application type.
///
/// `short_name("redhat", "/insights/platform/cost-management")` is
/// `"redhat-cost-management"`.
pub fn short_name(prefix: &str, application_type: &str) -> String {
    let base = application_type
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|base| !base.is_empty())
        .unwrap_or("unknown");
    format!("{}-{}", prefix, base)
}

/// `<short>-<label>-<guid>`
pub fn resource_name(short: &str, label: &str, guid: &str) -> String {
    format!("{}-{}-{}", short, label, guid)
}

/// Source of the per-ledger random id
pub trait IdSource: Send + Sync {
    fn generate_id(&self) -> String;
}

/// Ids drawn from the operating system's CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngIdSource;

impl IdSource for OsRngIdSource {
    fn generate_id(&self) -> String {
        let mut bytes = [0u8; ID_BYTES];
        // Panics if the OS random source fails; there is no sensible fallback.
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Always returns the same id
#[derive(Debug, Clone)]
pub struct FixedIdSource(pub String);

impl FixedIdSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdSource for FixedIdSource {
    fn generate_id(&self) -> String {
        self.0.clone()
    }
}
