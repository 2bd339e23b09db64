//! Construction errors for permission types.

use thiserror::Error;

/// Every way a permission can fail to construct. Comparison never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("illegal HTTP method spec actions: '{0}'")]
    InvalidHttpMethodSpec(String),

    #[error("invalid URL pattern spec '{spec}': {reason}")]
    InvalidUrlPatternSpec { spec: String, reason: &'static str },

    #[error("// in pattern '{0}'")]
    MalformedPattern(String),

    #[error("illegal transport value: '{0}'")]
    InvalidTransportType(String),

    #[error("illegal EJB method actions spec: '{0}'")]
    InvalidEjbActions(String),

    #[error("illegal EJB method name: '{0}'")]
    InvalidMethodName(String),

    #[error("illegal EJB method parameter: '{0}'")]
    InvalidMethodParam(String),

    #[error("illegal role reference: {0}")]
    InvalidRoleRef(String),
}

impl PermissionError {
    pub(crate) fn url_pattern_spec(spec: &str, reason: &'static str) -> Self {
        Self::InvalidUrlPatternSpec {
            spec: spec.to_string(),
            reason,
        }
    }
}

pub type PermissionResult<T> = Result<T, PermissionError>;
