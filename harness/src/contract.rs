//! Loader contract: the capability the harness instantiates artifacts
//! through.
//!
//! The harness does NOT parse, validate or execute modules; it delegates to
//! a [`ModuleLoader`] and talks to the resulting [`ModuleHandle`] by entry
//! point name only. Validity of the artifact is whatever the loader says it
//! is: a module the loader rejects never yields a handle.

use wasmhost_kernel::binary::module::FuncType;
use wasmhost_kernel::value::Value;

use crate::error::HarnessError;

/// A resolved, not yet invoked, entry point.
///
/// `F` is the loader's callable. Not `Clone`: [`ModuleHandle::invoke`]
/// consumes it, so each resolution admits exactly one call.
#[derive(Debug)]
pub struct EntryPoint<F> {
    name: String,
    signature: FuncType,
    func: F,
}

impl<F> EntryPoint<F> {
    #[must_use]
    pub fn new(name: impl Into<String>, signature: FuncType, func: F) -> Self {
        Self {
            name: name.into(),
            signature,
            func,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter and result types in host terms.
    #[must_use]
    pub fn signature(&self) -> &FuncType {
        &self.signature
    }

    #[must_use]
    pub fn func(&self) -> &F {
        &self.func
    }
}

/// Produces module handles from artifact bytes.
///
/// `instantiate` blocks until the loader has finished (success or
/// failure). One pending instantiation at a time; no cancellation.
pub trait ModuleLoader {
    type Handle: ModuleHandle;

    /// Instantiate `artifact`. The bytes are moved in and not handed back.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Instantiation`] if the bytes are not a valid
    /// module for this loader.
    fn instantiate(&self, artifact: Vec<u8>) -> Result<Self::Handle, HarnessError>;
}

/// An instantiated module exposing named entry points.
///
/// Methods take `&mut self`: a handle owns the module's store, and both
/// lookup and execution act on it.
pub trait ModuleHandle {
    /// The loader's callable behind an [`EntryPoint`].
    type Func;

    /// Look up the function export `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NotFound`] if no export has that name, the
    /// export is not a function, or its signature uses types the host
    /// cannot represent as [`Value`]s.
    fn resolve(&mut self, name: &str) -> Result<EntryPoint<Self::Func>, HarnessError>;

    /// Call `entry` with positional `args`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Invocation`] on argument mismatch or trap.
    fn invoke(
        &mut self,
        entry: EntryPoint<Self::Func>,
        args: &[Value],
    ) -> Result<Vec<Value>, HarnessError>;
}
