//! AWS error classification
//!
//! Uses the error code from `ProvideErrorMetadata` rather than string
//! matching on Debug output.

use aws_sdk_iam::error::ProvideErrorMetadata;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (safe to skip in teardown)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }
}

/// Codes meaning the resource is already gone
const NOT_FOUND_CODES: &[&str] = &["NoSuchEntity", "NoSuchBucket", "NoSuchKey"];

/// Classify an AWS error code
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any SDK error carrying error metadata (IAM and S3 alike)
pub fn classify<E: ProvideErrorMetadata>(error: &E) -> AwsError {
    classify_aws_error(error.code(), error.message())
}
