//! Placeholder substitution for step payloads
//!
//! Substitution is literal text replacement done in a single left-to-right
//! pass over the payload. Where several placeholders match at the same
//! position the longest one wins, so `ACCT_ID` is not eaten by `ACCT`.
//! Substituted values are never scanned again, which means a value that
//! happens to contain another placeholder token is left as is. There is no
//! escaping.

use crate::error::{Result, SuperKeyError};
use crate::ledger::ForgedApplication;
use crate::request::SubstitutionSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a placeholder whose value cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedSubstitution {
    /// Replace the placeholder with an empty string
    #[default]
    Empty,
    /// Leave the placeholder in the payload
    Keep,
    /// Fail the step
    Reject,
}

impl std::fmt::Display for UnresolvedSubstitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedSubstitution::Empty => write!(f, "empty"),
            UnresolvedSubstitution::Keep => write!(f, "keep"),
            UnresolvedSubstitution::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for UnresolvedSubstitution {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "empty" => Ok(UnresolvedSubstitution::Empty),
            "keep" => Ok(UnresolvedSubstitution::Keep),
            "reject" => Ok(UnresolvedSubstitution::Reject),
            other => Err(format!(
                "unknown substitution policy '{}' (expected empty, keep or reject)",
                other
            )),
        }
    }
}

/// Resolve a substitution source against the ledger
fn resolve<'a>(source: &SubstitutionSource, ledger: &'a ForgedApplication) -> Option<&'a str> {
    match source {
        SubstitutionSource::Account => ledger.request.account(),
        SubstitutionSource::StepOutput(kind) => ledger.steps_completed.output(*kind),
        SubstitutionSource::Unknown(_) => None,
    }
}

/// Replace every placeholder in `payload` with its resolved value.
///
/// Every entry is resolved up front, so `Reject` fails even when the
/// placeholder does not occur in the payload.
pub fn substitute(
    payload: &str,
    ledger: &ForgedApplication,
    substitutions: &BTreeMap<String, SubstitutionSource>,
    policy: UnresolvedSubstitution,
) -> Result<String> {
    // (placeholder, replacement); `Keep` maps a placeholder to itself
    let mut replacements: Vec<(&str, &str)> = Vec::with_capacity(substitutions.len());

    for (placeholder, source) in substitutions {
        if placeholder.is_empty() {
            continue;
        }

        let value = match resolve(source, ledger) {
            Some(value) => value,
            None => match policy {
                UnresolvedSubstitution::Empty => {
                    tracing::warn!(
                        placeholder = %placeholder,
                        source = %source,
                        "Unresolved substitution, replacing with empty string"
                    );
                    ""
                }
                UnresolvedSubstitution::Keep => {
                    tracing::warn!(
                        placeholder = %placeholder,
                        source = %source,
                        "Unresolved substitution, leaving placeholder in payload"
                    );
                    placeholder.as_str()
                }
                UnresolvedSubstitution::Reject => {
                    return Err(SuperKeyError::UnresolvedSubstitution {
                        placeholder: placeholder.clone(),
                        source_name: source.to_string(),
                    });
                }
            },
        };

        replacements.push((placeholder.as_str(), value));
    }

    // Longest first, so the first hit at a position is the longest match
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut output = String::with_capacity(payload.len());
    let mut rest = payload;
    while let Some(ch) = rest.chars().next() {
        match replacements
            .iter()
            .find(|(placeholder, _)| rest.starts_with(placeholder))
        {
            Some((placeholder, value)) => {
                output.push_str(value);
                rest = &rest[placeholder.len()..];
            }
            None => {
                output.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StepOutput;
    use crate::request::{CreateRequest, Step, StepKind};
    use std::sync::Arc;

    fn ledger_with_bucket(bucket: &str) -> ForgedApplication {
        let request = CreateRequest::new("/app/foo", vec![Step::new("s3")])
            .with_extra("account", "123456789012");
        let mut app = ForgedApplication::new(Arc::new(request), "abc123");
        app.mark_completed(StepOutput::Bucket {
            name: bucket.to_string(),
        });
        app
    }

    fn subs(entries: &[(&str, &str)]) -> BTreeMap<String, SubstitutionSource> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), SubstitutionSource::from(*v)))
            .collect()
    }

    #[test]
    fn test_prior_step_output() {
        let app = ledger_with_bucket("my-bucket-abc123");
        let mut map = BTreeMap::new();
        map.insert(
            "{{BUCKET}}".to_string(),
            SubstitutionSource::StepOutput(StepKind::Bucket),
        );

        let result = substitute("arn:{{BUCKET}}", &app, &map, UnresolvedSubstitution::Empty).unwrap();
        assert_eq!(result, "arn:my-bucket-abc123");
    }

    #[test]
    fn test_every_occurrence_and_account() {
        let app = ledger_with_bucket("b");
        let map = subs(&[("S3BUCKET", "s3"), ("ACCOUNT", "get_account")]);

        let result = substitute(
            "arn:aws:s3:::S3BUCKET arn:aws:s3:::S3BUCKET/* ACCOUNT",
            &app,
            &map,
            UnresolvedSubstitution::Reject,
        )
        .unwrap();
        assert_eq!(result, "arn:aws:s3:::b arn:aws:s3:::b/* 123456789012");
    }

    #[test]
    fn test_unresolved_empty() {
        let app = ledger_with_bucket("b");
        let map = subs(&[("POLICY", "policy")]);

        let result = substitute("x-POLICY-y", &app, &map, UnresolvedSubstitution::Empty).unwrap();
        assert_eq!(result, "x--y");
    }

    #[test]
    fn test_unresolved_keep() {
        let app = ledger_with_bucket("b");
        let map = subs(&[("THING", "mystery")]);

        let result = substitute("x-THING-y", &app, &map, UnresolvedSubstitution::Keep).unwrap();
        assert_eq!(result, "x-THING-y");
    }

    #[test]
    fn test_unresolved_reject() {
        let request = CreateRequest::new("/app/foo", vec![]);
        let app = ForgedApplication::new(Arc::new(request), "abc123");
        let map = subs(&[("ACCOUNT", "get_account")]);

        let err = substitute("ACCOUNT", &app, &map, UnresolvedSubstitution::Reject).unwrap_err();
        match err {
            SuperKeyError::UnresolvedSubstitution {
                placeholder,
                source_name,
            } => {
                assert_eq!(placeholder, "ACCOUNT");
                assert_eq!(source_name, "get_account");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_substitutions() {
        let app = ledger_with_bucket("b");
        let result = substitute(
            "{\"Version\": \"2012-10-17\"}",
            &app,
            &BTreeMap::new(),
            UnresolvedSubstitution::Reject,
        )
        .unwrap();
        assert_eq!(result, "{\"Version\": \"2012-10-17\"}");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        // The account value spells out another placeholder
        let request = CreateRequest::new("/app/foo", vec![]).with_extra("account", "BUCKET");
        let mut app = ForgedApplication::new(Arc::new(request), "abc123");
        app.mark_completed(StepOutput::Bucket {
            name: "b".to_string(),
        });
        let map = subs(&[("ACCOUNT", "get_account"), ("BUCKET", "s3")]);

        let result = substitute("ACCOUNT:BUCKET", &app, &map, UnresolvedSubstitution::Reject).unwrap();
        assert_eq!(result, "BUCKET:b");
    }

    #[test]
    fn test_overlapping_placeholders() {
        let request = CreateRequest::new("/app/foo", vec![]).with_extra("account", "111");
        let mut app = ForgedApplication::new(Arc::new(request), "abc123");
        app.mark_completed(StepOutput::Bucket {
            name: "b".to_string(),
        });

        // A shorter token is plain text inside a longer word
        let map = subs(&[("ACCT", "get_account")]);
        let result = substitute("ACCT ACCT_ID", &app, &map, UnresolvedSubstitution::Reject).unwrap();
        assert_eq!(result, "111 111_ID");

        // With both keys present the longer one wins
        let map = subs(&[("ACCT", "get_account"), ("ACCT_ID", "s3")]);
        let result = substitute("ACCT ACCT_ID", &app, &map, UnresolvedSubstitution::Reject).unwrap();
        assert_eq!(result, "111 b");
    }

    #[test]
    fn test_non_ascii_payload() {
        let app = ledger_with_bucket("b");
        let map = subs(&[("S3BUCKET", "s3")]);

        let result = substitute("é→S3BUCKET←ü", &app, &map, UnresolvedSubstitution::Reject).unwrap();
        assert_eq!(result, "é→b←ü");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "reject".parse::<UnresolvedSubstitution>(),
            Ok(UnresolvedSubstitution::Reject)
        );
        assert!("nope".parse::<UnresolvedSubstitution>().is_err());
    }
}
