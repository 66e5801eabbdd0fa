use thiserror::Error;

/// Why a recorder operation ended early
///
/// None of these reach the caller; the manager logs them at the operation
/// boundary and reports an outcome instead.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("audio host call `{op}` failed: {source:#}")]
    Host {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("no recorded sound at index {index} ({len} recorded)")]
    InvalidIndex { index: usize, len: usize },

    #[error("recording produced no usable sound")]
    EmptyResult,
}

impl RecorderError {
    pub(crate) fn host(op: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| RecorderError::Host { op, source }
    }
}
