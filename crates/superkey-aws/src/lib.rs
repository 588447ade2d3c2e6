//! Amazon provider for SuperKey
//!
//! This crate implements the SuperKeyProvider trait for AWS, forging an
//! application out of an S3 bucket, an IAM policy, an IAM role and the
//! attachment of that policy to the role.
//!
//! # Steps
//!
//! - `s3`: create a bucket named `<short>-bucket-<guid>`
//! - `policy`: create a managed policy from the step payload
//! - `role`: create a role whose trust policy is the step payload
//! - `bind_role`: attach the policy to the role
//!
//! # Requirements
//!
//! - AWS credentials resolvable by the default provider chain
//! - IAM permissions to create and delete buckets, policies and roles
//!
//! # Example
//!
//! ```ignore
//! use superkey_aws::{AmazonProvider, AwsResourceClient};
//! use superkey_core::{ProviderSettings, SuperKeyProvider};
//!
//! let client = AwsResourceClient::new("us-east-1").await;
//! let provider = AmazonProvider::new(client, ProviderSettings::default());
//!
//! match provider.forge_application(request).await {
//!     Ok(app) => println!("role: {:?}", app.result_username),
//!     Err(failure) => {
//!         let (mut app, error) = failure.into_parts();
//!         let cleanup = provider.tear_down(&mut app).await;
//!     }
//! }
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod provider;

pub use client::{AwsResourceClient, ResourceClient};
pub use context::AwsContext;
pub use error::{AwsError, classify_aws_error};
pub use provider::{AmazonProvider, PROVIDER_NAME};
