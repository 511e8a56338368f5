//! The functional core: directives in, C source plus a build context out.
//!
//! Every directive is lowered before anything is rendered, so shape and
//! dispatch errors surface before a compiler is ever spawned.
pub mod ast;
pub mod emit;
pub mod lower;
pub mod probe;
pub mod registry;
pub mod shim;
pub mod types;
pub mod wrapper;

pub use registry::Mode;

use crate::model::BuildContext;

/// Mutable state threaded through rendering of one file.
#[derive(Debug)]
pub struct Session {
    pub mode: Mode,
    pub context: BuildContext,
    namespace: Option<String>,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            context: BuildContext::new(),
            namespace: None,
        }
    }

    /// Module opened by the last `in-namespace`, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn enter_namespace(&mut self, name: &str) {
        self.namespace = Some(name.to_string());
    }

    pub fn into_context(self) -> BuildContext {
        self.context
    }
}
