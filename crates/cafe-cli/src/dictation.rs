//! Voice query capture.

use std::future::Future;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictationError {
    #[error("voice input is not supported on this device")]
    Unsupported,

    #[error("voice input failed: {0}")]
    Failed(String),
}

/// A speech-to-text engine. Each activation yields at most one final
/// transcript.
pub trait Dictation {
    fn listen(&self) -> impl Future<Output = Result<String, DictationError>>;
}

/// The terminal build has no speech engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDictation;

impl Dictation for NoDictation {
    fn listen(&self) -> impl Future<Output = Result<String, DictationError>> {
        async { Err(DictationError::Unsupported) }
    }
}
