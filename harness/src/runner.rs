//! Harness runner: drives one artifact through a [`ModuleLoader`] and writes
//! the report.
//!
//! # Pipeline
//!
//! ```text
//! load(path) → loader.instantiate(bytes)
//!   → [resolve() × N] → [invoke() × N] → drop handle
//!   → write result lines → write success marker → flush
//! ```
//!
//! Every step that can fail runs before the first line is written, so a
//! failed run leaves the output sink untouched.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use wasmhost_kernel::value::Value;
use wasmhost_kernel::hash::{artifact_digest, ContentHash};

use crate::config::HarnessConfig;
use crate::contract::{ModuleHandle, ModuleLoader};
use crate::error::HarnessError;

/// Artifact bytes read from disk, with their digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub digest: ContentHash,
}

/// Read the artifact at `path`.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the file is missing or unreadable.
pub fn load(path: &Path) -> Result<Artifact, HarnessError> {
    let bytes = std::fs::read(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = artifact_digest(&bytes);
    debug!(path = %path.display(), bytes = bytes.len(), %digest, "artifact loaded");
    Ok(Artifact {
        path: path.to_path_buf(),
        bytes,
        digest,
    })
}

/// One completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub name: String,
    pub args: Vec<Value>,
    pub results: Vec<Value>,
}

/// Everything a successful run produced, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub artifact_path: PathBuf,
    pub artifact_digest: ContentHash,
    pub outcomes: Vec<CallOutcome>,
    pub success_marker: String,
}

impl RunReport {
    /// Report lines: one per outcome, then the success marker.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|outcome| render_results(&outcome.results))
            .chain(std::iter::once(self.success_marker.clone()))
            .collect()
    }

    /// Write [`RunReport::lines`] to `out`, newline-terminated, and flush.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Output`] if writing or flushing fails.
    pub fn write_lines<W: Write>(&self, out: &mut W) -> Result<(), HarnessError> {
        let mut buf = String::new();
        for line in self.lines() {
            buf.push_str(&line);
            buf.push('\n');
        }
        out.write_all(buf.as_bytes()).map_err(HarnessError::Output)?;
        out.flush().map_err(HarnessError::Output)
    }
}

/// Display form of one call's results: bare value for a single result,
/// space-separated for several, empty for none.
#[must_use]
pub fn render_results(results: &[Value]) -> String {
    let mut line = String::new();
    for (i, value) in results.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(line, "{value}");
    }
    line
}

/// Run `config` through `loader`, writing the report to `out`.
///
/// # Errors
///
/// Returns the first [`HarnessError`] encountered. Nothing is written to
/// `out` unless every load, instantiate, resolve and invoke step succeeded.
pub fn run<L, W>(config: &HarnessConfig, loader: &L, out: &mut W) -> Result<RunReport, HarnessError>
where
    L: ModuleLoader,
    W: Write,
{
    let Artifact {
        path,
        bytes,
        digest,
    } = load(&config.artifact_path)?;

    let mut handle = loader.instantiate(bytes)?;

    let entries = config
        .calls
        .iter()
        .map(|call| handle.resolve(&call.name))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = entries.len(), "entry points resolved");

    let mut outcomes = Vec::with_capacity(entries.len());
    for (call, entry) in config.calls.iter().zip(entries) {
        let results = handle.invoke(entry, &call.args)?;
        debug!(name = %call.name, ?results, "entry point returned");
        outcomes.push(CallOutcome {
            name: call.name.clone(),
            args: call.args.clone(),
            results,
        });
    }
    drop(handle);

    let report = RunReport {
        artifact_path: path,
        artifact_digest: digest,
        outcomes,
        success_marker: config.success_marker.clone(),
    };
    report.write_lines(out)?;
    info!(
        path = %report.artifact_path.display(),
        digest = %report.artifact_digest,
        calls = report.outcomes.len(),
        "run complete"
    );
    Ok(report)
}
