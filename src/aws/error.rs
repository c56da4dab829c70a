//! AWS error classification
//!
//! Typed errors for SDK operations, classified from the provider error
//! code via `ProvideErrorMetadata` rather than string matching on the
//! Debug format wherever a typed error is reachable.

use thiserror::Error;

/// Provider error categories driving the teardown failure policy
#[derive(Debug, Error)]
pub enum CloudError {
    /// Resource was not found (safe to skip during teardown)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded")]
    Throttled,

    /// Resource has dependent objects still attached (retryable; e.g. a
    /// security group whose ENIs are still releasing)
    #[error("Resource has dependent objects")]
    DependencyViolation,

    /// Generic SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl CloudError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CloudError::Throttled | CloudError::DependencyViolation
        )
    }
}

/// Provider codes meaning the target is already gone
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidVpcID.NotFound",
    "InvalidInstanceID.NotFound",
    "InvalidAllocationID.NotFound",
    "InvalidAssociationID.NotFound",
    "InvalidAddress.NotFound",
    "InvalidGroup.NotFound",
    "InvalidPermission.NotFound",
    "InvalidNetworkInterfaceID.NotFound",
    "InvalidInternetGatewayID.NotFound",
    "InvalidRouteTableID.NotFound",
    "InvalidRoute.NotFound",
    "InvalidSubnetID.NotFound",
    "InvalidVpcPeeringConnectionID.NotFound",
    "InvalidVpcEndpointId.NotFound",
    "NatGatewayNotFound",
    "LoadBalancerNotFound",
    "Gateway.NotAttached",
];

/// Provider codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Classify a provider error by code.
pub fn classify_cloud_error(code: Option<&str>, message: Option<&str>) -> CloudError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => CloudError::NotFound { message },
        Some(c) if THROTTLING_CODES.contains(&c) => CloudError::Throttled,
        Some("DependencyViolation") => CloudError::DependencyViolation,
        _ => CloudError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an `anyhow::Error`, extracting the provider code from the
/// Debug representation of whatever SDK error is in the chain.
///
/// SDK operation errors are distinct generated types per operation; with
/// the dozens of operations teardown issues, downcasting each would be
/// unwieldy, and the code string survives in the Debug output either way.
pub fn classify_anyhow_error(error: &anyhow::Error) -> CloudError {
    let debug_str = format!("{error:?}");

    for code in NOT_FOUND_CODES {
        if debug_str.contains(code) {
            return CloudError::NotFound { message: debug_str };
        }
    }
    for code in THROTTLING_CODES {
        if debug_str.contains(code) {
            return CloudError::Throttled;
        }
    }
    if debug_str.contains("DependencyViolation") {
        return CloudError::DependencyViolation;
    }

    if let Some(code) = extract_error_code(&debug_str) {
        return classify_cloud_error(Some(&code), Some(&debug_str));
    }

    CloudError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// Extract any code from a `code: Some("...")` pattern in a debug string
fn extract_error_code(debug_str: &str) -> Option<String> {
    let start = debug_str.find("code: Some(\"")?;
    let rest = &debug_str[start + 12..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Convert a NotFound SDK error into `Ok(None)`, keeping deletes
/// idempotent: the target being already gone is the goal state.
pub fn ignore_not_found<T, E, R>(
    result: Result<T, aws_sdk_ec2::error::SdkError<E, R>>,
) -> Result<Option<T>, aws_sdk_ec2::error::SdkError<E, R>>
where
    E: aws_sdk_ec2::error::ProvideErrorMetadata,
{
    use aws_sdk_ec2::error::ProvideErrorMetadata;

    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let code = e.code().map(|c| c.to_string());
            if classify_cloud_error(code.as_deref(), e.message()).is_not_found() {
                Ok(None)
            } else {
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_cloud_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_cloud_error(Some(code), Some("msg"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
            assert!(matches!(err, CloudError::Throttled));
        }
    }

    #[test]
    fn dependency_violation() {
        let err = classify_cloud_error(Some("DependencyViolation"), Some("ENI attached"));
        assert!(err.is_retryable());
        assert!(matches!(err, CloudError::DependencyViolation));
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_cloud_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, CloudError::Sdk { .. }));

        let err2 = classify_cloud_error(None, Some("something failed"));
        assert!(matches!(err2, CloudError::Sdk { code: None, .. }));
    }

    #[test]
    fn classify_from_debug_string() {
        let err = anyhow::anyhow!(
            "service error: Error {{ code: Some(\"InvalidRouteTableID.NotFound\") }}"
        );
        // anyhow Debug output includes the message, so code extraction works
        assert!(classify_anyhow_error(&err).is_not_found());
    }

    #[test]
    fn extract_code_from_code_field() {
        let debug_str = r#"SdkError { code: Some("SomeRandomCode"), message: "fail" }"#;
        assert_eq!(
            extract_error_code(debug_str).as_deref(),
            Some("SomeRandomCode")
        );
    }

    #[test]
    fn extract_none_from_unrelated_string() {
        assert!(extract_error_code("connection refused").is_none());
    }
}
