use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a fill attempt did not end in `Loaded`.
///
/// Error kinds end in `Failed`; the other two are ordinary outcomes that end
/// in `Empty`:
/// - Transient errors (ReadinessTimeout, ElementMissing, ProviderError) may be
///   retried automatically when a backoff policy is configured
/// - Registration errors are never retried automatically
/// - Unfilled and DetectionTimeout mean the provider had nothing to serve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Delivery script never signaled readiness
    ReadinessTimeout,

    /// Pushing the fill request onto the delivery queue threw
    Registration,

    /// Slot container was absent when it was classified
    ElementMissing,

    /// Provider marked the slot with an error status
    ProviderError,

    /// Provider explicitly reported no inventory (not an error)
    Unfilled,

    /// No conclusive classification before the hard timeout (folded into Empty)
    DetectionTimeout,
}

impl FailureKind {
    /// Whether this kind ends the attempt in `Failed` rather than `Empty`.
    pub fn is_error(&self) -> bool {
        !matches!(self, FailureKind::Unfilled | FailureKind::DetectionTimeout)
    }

    /// Whether an automatic retry may help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FailureKind::ReadinessTimeout | FailureKind::ElementMissing | FailureKind::ProviderError
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ReadinessTimeout => write!(f, "readiness-timeout"),
            FailureKind::Registration => write!(f, "registration"),
            FailureKind::ElementMissing => write!(f, "element-missing"),
            FailureKind::ProviderError => write!(f, "provider-error"),
            FailureKind::Unfilled => write!(f, "unfilled"),
            FailureKind::DetectionTimeout => write!(f, "detection-timeout"),
        }
    }
}

/// Errors that move a slot into `Failed`.
///
/// The `Display` text is what ends up in `Failed.error_message`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("delivery script not ready")]
    ReadinessTimeout,
    #[error("fill request registration failed: {0}")]
    Registration(String),
    #[error("element not found")]
    ElementMissing,
    #[error("provider reported an error status")]
    ProviderError,
}

impl SlotError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SlotError::ReadinessTimeout => FailureKind::ReadinessTimeout,
            SlotError::Registration(_) => FailureKind::Registration,
            SlotError::ElementMissing => FailureKind::ElementMissing,
            SlotError::ProviderError => FailureKind::ProviderError,
        }
    }
}
