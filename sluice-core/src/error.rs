use thiserror::Error as ThisError;

/// Typed failures raised by sluice.
///
/// They travel inside [`crate::Error`] (an `anyhow::Error`) like every other error of the
/// crate, callers that need to branch on them use `downcast_ref::<SluiceError>()`.
#[derive(Debug, ThisError)]
pub enum SluiceError {
    /// No wire type could be determined for a value and no override was supplied.
    #[error("Cannot resolve the type of `{path}`: {reason}")]
    UnresolvableType { path: String, reason: String },
    /// A wire type disagrees with the value or with its encoded form.
    #[error("Type mismatch for `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
    /// Releasing the resources of a row source failed.
    #[error("Failed to release the row source")]
    SourceDisposal(#[source] anyhow::Error),
}

impl SluiceError {
    pub fn unresolvable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableType {
            path: path.into(),
            reason: reason.into(),
        }
    }
    pub fn mismatch(
        path: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::UnresolvableType { .. })
    }
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
    pub fn is_disposal(&self) -> bool {
        matches!(self, Self::SourceDisposal(..))
    }
}
