//! Analysis errors.

use std::any::Any;

use thiserror::Error;

use crate::hir::IndexError;

/// Errors raised while analysing.
///
/// Only [`AnalysisError::Cancelled`] ever reaches callers of the public
/// entry points. Resolution failures and faults are contained to the
/// branch that hit them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The caller's cancellation token fired.
    #[error("analysis cancelled")]
    Cancelled,

    /// A declaration could not be resolved.
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// The index or the engine failed unexpectedly.
    #[error("Analysis fault: {0}")]
    Fault(String),
}

impl AnalysisError {
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<IndexError> for AnalysisError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::UnknownDeclaration(what) => Self::Resolution(what),
            IndexError::Fault(msg) => Self::Fault(msg),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Text of a panic payload caught with `catch_unwind`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
