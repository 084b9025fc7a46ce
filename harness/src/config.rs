//! Harness configuration: which artifact to load and which entry points to
//! call with which literal arguments.
//!
//! [`HarnessConfig::default`] is the fixed configuration the `wasmhost`
//! binary runs: `./test.wasm`, `get_const_val()`, `add_two_nums(5, 4)`,
//! then `Success!`.

use std::path::PathBuf;

use wasmhost_kernel::value::Value;

use crate::fixtures::{ADD_TWO_NUMS, GET_CONST_VAL};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_ARTIFACT_PATH: &str = "./test.wasm";

/// Line written after all results.
pub const SUCCESS_MARKER: &str = "Success!";

/// One entry-point call: export name plus positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    pub name: String,
    pub args: Vec<Value>,
}

impl CallSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, args: impl Into<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
        }
    }
}

/// Everything a harness run needs besides the loader and output sink.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub artifact_path: PathBuf,
    /// Calls in invocation (and report) order.
    pub calls: Vec<CallSpec>,
    pub success_marker: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            calls: vec![
                CallSpec::new(GET_CONST_VAL, []),
                CallSpec::new(ADD_TWO_NUMS, [Value::I32(5), Value::I32(4)]),
            ],
            success_marker: SUCCESS_MARKER.to_string(),
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    #[must_use]
    pub fn with_calls(mut self, calls: Vec<CallSpec>) -> Self {
        self.calls = calls;
        self
    }

    #[must_use]
    pub fn with_success_marker(mut self, marker: impl Into<String>) -> Self {
        self.success_marker = marker.into();
        self
    }
}
