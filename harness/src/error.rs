//! Typed harness failures.
//!
//! None of these are recovered locally: any failure aborts the remaining
//! sequence and is returned to the process boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Error during a harness run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The artifact file is missing or unreadable.
    #[error("cannot read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The loader rejected the artifact bytes.
    #[error("instantiation failed: {detail}")]
    Instantiation { detail: String },
    /// No function export with the requested name.
    #[error("entry point \"{name}\" not found: {detail}")]
    NotFound { name: String, detail: String },
    /// The entry point was called but did not complete.
    #[error("invocation of \"{name}\" failed: {detail}")]
    Invocation { name: String, detail: String },
    /// Writing the report to the output sink failed.
    #[error("cannot write report: {0}")]
    Output(#[source] std::io::Error),
}
