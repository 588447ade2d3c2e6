//! SuperKey Forge core
//!
//! This crate provides the provider-independent half of SuperKey: the
//! request model, the step ledger, resource naming, payload templating and
//! the provider abstraction that runs a request's steps in order and
//! compensates for them in reverse.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  superkey CLI                    │
//! │             (superkey forge/teardown)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 superkey-core                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait SuperKeyProvider { ... }           │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Templater   │  │ Step Ledger  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │    amazon     │
//! │   provider    │
//! └───────────────┘
//! ```

pub mod error;
pub mod ledger;
pub mod naming;
pub mod provider;
pub mod request;
pub mod template;

// Re-exports
pub use error::{ForgeFailure, Result, SuperKeyError};
pub use ledger::{BindRecord, ForgedApplication, RoleRecord, StepOutput, StepsCompleted};
pub use naming::{FixedIdSource, IdSource, OsRngIdSource, resource_name, short_name};
pub use provider::{ProviderRegistry, ProviderSettings, SuperKeyProvider};
pub use request::{CreateRequest, Step, StepKind, SubstitutionSource};
pub use template::{UnresolvedSubstitution, substitute};
