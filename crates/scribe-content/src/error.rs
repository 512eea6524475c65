use miette::Diagnostic;
use thiserror::Error;

use scribe_attachment::StoreError;

use crate::sanitize::PurifyError;

/// Failure of a whole assembly call.
///
/// Unresolvable references and malformed markers are not errors (they
/// degrade to marker removal / no match); only external collaborators can
/// fail an assembly, and a failed assembly never yields partially rewritten
/// content.
#[derive(Debug, Error, Diagnostic)]
pub enum AssembleError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Purify(#[from] PurifyError),
}
