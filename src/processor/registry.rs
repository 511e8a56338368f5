//! Dispatch table from directive tags to their lowering functions.

use std::collections::HashMap;

use super::ast::Lowered;
use super::lower::{self, LowerFn};
use crate::error::{GenerateError, RegistryError};
use crate::model::{Directive, DirectiveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compile and run a probe that writes the bindings.
    Grovel,
    /// Compile a shared library of forwarding shims.
    Wrapper,
}

/// Directives understood by both modes.
const SHARED: &[(&str, LowerFn)] = &[
    ("c", lower::raw_c),
    ("include", lower::include),
    ("define", lower::define),
    ("typedef", lower::typedef),
    ("flag", lower::flags),
    ("cc-flags", lower::flags),
    ("pkg-config-cflags", lower::pkg_config),
    ("in-namespace", lower::namespace),
];

const GROVEL: &[(&str, LowerFn)] = &[
    ("constant", lower::constant),
    ("ctype", lower::ctype),
    ("cstruct", lower::cstruct),
    ("cunion", lower::cunion),
    ("cenum", lower::cenum),
    ("constantenum", lower::constantenum),
];

const WRAPPER: &[(&str, LowerFn)] = &[
    ("defwrapper", lower::defwrapper),
    ("defwrapper*", lower::defwrapper_star),
];

#[derive(Debug, Default)]
pub struct Registry {
    handlers: HashMap<DirectiveKind, LowerFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for one pipeline mode.
    pub fn for_mode(mode: Mode) -> Result<Self, RegistryError> {
        let specific = match mode {
            Mode::Grovel => GROVEL,
            Mode::Wrapper => WRAPPER,
        };
        let mut registry = Self::new();
        for (tag, handler) in SHARED.iter().chain(specific) {
            registry.register(tag, *handler)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tag: &str, handler: LowerFn) -> Result<(), RegistryError> {
        let kind =
            DirectiveKind::from_tag(tag).ok_or_else(|| RegistryError::UnknownTag(tag.to_string()))?;
        if self.handlers.insert(kind, handler).is_some() {
            return Err(RegistryError::Duplicate(tag.to_string()));
        }
        Ok(())
    }

    pub fn lower(&self, directive: &Directive) -> Result<Lowered, GenerateError> {
        let unknown = || GenerateError::UnknownDirective {
            tag: directive.tag.clone(),
            line: directive.line,
        };
        let kind = DirectiveKind::from_tag(&directive.tag).ok_or_else(unknown)?;
        let handler = self.handlers.get(&kind).ok_or_else(unknown)?;
        Ok(Lowered {
            kind,
            line: directive.line,
            rule: handler(directive)?,
        })
    }

    /// Lower a whole file; the first shape or dispatch error wins.
    pub fn lower_all(&self, directives: &[Directive]) -> Result<Vec<Lowered>, GenerateError> {
        directives.iter().map(|d| self.lower(d)).collect()
    }
}
