//! Directive model shared by the reader, the processor and the writers.

use std::fmt;

/// A possibly namespace-qualified symbol.
///
/// Bare symbols pick up the namespace that was active when they were read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub namespace: Option<String>,
    pub name: String,
}

impl Symbol {
    pub fn new(namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}::{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// An integer as written in the source.
///
/// `text` keeps the spelling (`0644`, `0xFF`) so text-level directives can
/// pass it to C unchanged; `value` is what C would read it as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntLiteral {
    pub value: i128,
    pub text: String,
}

impl From<i64> for IntLiteral {
    fn from(value: i64) -> Self {
        Self {
            value: value.into(),
            text: value.to_string(),
        }
    }
}

/// One element of a specification file after reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    Symbol(Symbol),
    Keyword(String),
    Str(String),
    Int(IntLiteral),
    List(Vec<Form>),
}

impl Form {
    /// Short description used in shape errors.
    pub fn describe(&self) -> String {
        match self {
            Form::Symbol(s) => format!("symbol `{s}`"),
            Form::Keyword(k) => format!("keyword `:{k}`"),
            Form::Str(s) => format!("string {s:?}"),
            Form::Int(n) => format!("integer {}", n.text),
            Form::List(items) => format!("list of {} elements", items.len()),
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Form::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Form::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Form::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Form]> {
        match self {
            Form::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One top-level form: the directive tag plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub tag: String,
    pub args: Vec<Form>,
    pub line: usize,
}

/// Every directive tag the processor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    RawC,
    Include,
    Define,
    Typedef,
    Flag,
    CcFlags,
    PkgConfigCflags,
    InNamespace,
    Constant,
    CType,
    CStruct,
    CUnion,
    CEnum,
    ConstantEnum,
    DefWrapper,
    DefWrapperStar,
}

impl DirectiveKind {
    pub const ALL: &'static [DirectiveKind] = &[
        DirectiveKind::RawC,
        DirectiveKind::Include,
        DirectiveKind::Define,
        DirectiveKind::Typedef,
        DirectiveKind::Flag,
        DirectiveKind::CcFlags,
        DirectiveKind::PkgConfigCflags,
        DirectiveKind::InNamespace,
        DirectiveKind::Constant,
        DirectiveKind::CType,
        DirectiveKind::CStruct,
        DirectiveKind::CUnion,
        DirectiveKind::CEnum,
        DirectiveKind::ConstantEnum,
        DirectiveKind::DefWrapper,
        DirectiveKind::DefWrapperStar,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            DirectiveKind::RawC => "c",
            DirectiveKind::Include => "include",
            DirectiveKind::Define => "define",
            DirectiveKind::Typedef => "typedef",
            DirectiveKind::Flag => "flag",
            DirectiveKind::CcFlags => "cc-flags",
            DirectiveKind::PkgConfigCflags => "pkg-config-cflags",
            DirectiveKind::InNamespace => "in-namespace",
            DirectiveKind::Constant => "constant",
            DirectiveKind::CType => "ctype",
            DirectiveKind::CStruct => "cstruct",
            DirectiveKind::CUnion => "cunion",
            DirectiveKind::CEnum => "cenum",
            DirectiveKind::ConstantEnum => "constantenum",
            DirectiveKind::DefWrapper => "defwrapper",
            DirectiveKind::DefWrapperStar => "defwrapper*",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Header kinds emit text that must sit before the generated `main`.
    pub fn is_header(self) -> bool {
        matches!(
            self,
            DirectiveKind::RawC
                | DirectiveKind::Include
                | DirectiveKind::Define
                | DirectiveKind::Typedef
        )
    }
}

/// A foreign function declaration collected while generating wrappers.
///
/// Types are already spelled as Rust paths relative to `namespace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignFunction {
    pub name: String,
    pub symbol: String,
    pub abi: &'static str,
    pub params: Vec<(String, String)>,
    pub ret: Option<String>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Namespace(String),
    Function(ForeignFunction),
}

/// Per-run accumulator for compiler flags and wrapper declarations.
#[derive(Debug, Default)]
pub struct BuildContext {
    flags: Vec<String>,
    declarations: Vec<Declaration>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_flags<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn push_declaration(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}
