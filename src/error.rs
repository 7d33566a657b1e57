use micro_compiler::emit::AssemblyError;
use micro_core::{MicroError, ParseErrors};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that prevent a compile from producing a result.
///
/// Semantic errors are not failures; they are carried by
/// [`CompiledProgram::errors`](crate::CompiledProgram::errors).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The source could not be lexed or parsed.
    #[error(transparent)]
    Front(#[from] MicroError),

    /// Generated code was structurally invalid.
    #[error("assembly failed: {0}")]
    Assembly(#[from] AssemblyError),
}

impl From<ParseErrors> for Error {
    fn from(errors: ParseErrors) -> Self {
        Error::Front(errors.into())
    }
}
