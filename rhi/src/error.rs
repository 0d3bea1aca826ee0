//! Error type.
//!
//! This is the shared error type for the RHI and its backends. Creation functions return
//! `Err` where a native API would hand back a null object; contract violations are
//! `debug_assert!`s and are not represented here.

use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A capability required by the requested object is not available on this context.
    #[error("unsupported feature: {feature}")]
    Unsupported { feature: &'static str },
    /// Shader compilation failed; carries the native info log.
    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),
    /// Program linking failed; carries the native info log.
    #[error("program link failed: {0}")]
    ProgramLink(String),
    /// Program pipeline validation failed; carries the native info log.
    #[error("program pipeline validation failed: {0}")]
    ProgramPipelineValidation(String),
    /// Framebuffer completeness check failed with the given native status.
    #[error("incomplete framebuffer (status 0x{0:04X})")]
    IncompleteFramebuffer(u32),
    /// The native map call did not return a pointer.
    #[error("failed to map resource")]
    MapFailed,
    #[error("invalid description: {0}")]
    InvalidDescription(&'static str),
    /// No native context is current, or the context failed to initialize.
    #[error("no usable native context")]
    NoContext,
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn unsupported(feature: &'static str) -> Error {
        Error::Unsupported { feature }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
