//! Typed form of each directive, produced by `lower` once its shape checks out.

use super::types::TypeRef;
use crate::model::DirectiveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantType {
    Integer,
    Double,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantSpec {
    /// Rust constant name.
    pub name: String,
    /// Macros tried in order; the first one defined wins.
    pub candidates: Vec<String>,
    pub documentation: Option<String>,
    pub optional: bool,
    pub ty: ConstantType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotCount {
    Fixed(u64),
    /// C expression evaluated by the probe, e.g. a size macro.
    Named(String),
    /// Trailing array sized from the real layout at probe time.
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    /// Rust-side prefix of the slot constants (`TV_SEC`).
    pub name: String,
    pub native: String,
    pub ty: TypeRef,
    pub count: SlotCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpec {
    pub kind: RecordKind,
    pub name: String,
    pub native: String,
    pub documentation: Option<String>,
    pub slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub candidates: Vec<String>,
    pub documentation: Option<String>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    pub name: String,
    pub base: TypeRef,
    pub documentation: Option<String>,
    /// `constantenum`: members are macros, tried in order like constants.
    /// `cenum` members may be plain enumerators and are used as written.
    pub macro_members: bool,
    /// Only `constantenum` may set this.
    pub define_constants: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    C,
    System,
}

impl Convention {
    pub fn abi(self) -> &'static str {
        match self {
            Convention::C => "C",
            Convention::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WrapperBody {
    /// `return native(args...);`
    Forward,
    /// Caller-supplied C statements, emitted verbatim.
    Raw(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrapperSpec {
    pub name: String,
    pub native: String,
    pub convention: Convention,
    pub documentation: Option<String>,
    pub ret: TypeRef,
    pub params: Vec<(String, TypeRef)>,
    pub body: WrapperBody,
}

impl WrapperSpec {
    /// Exported name of the generated shim.
    pub fn symbol(&self) -> String {
        format!("{}_wrap", self.native)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    RawC(Vec<String>),
    Include(Vec<String>),
    Define { name: String, value: Option<String> },
    Typedef { base: String, alias: String },
    Flags(Vec<String>),
    PkgConfig { packages: Vec<String>, optional: bool },
    Namespace(String),
    Constant(ConstantSpec),
    CType {
        name: String,
        native: String,
        documentation: Option<String>,
    },
    Record(RecordSpec),
    Enum(EnumSpec),
    Wrapper(WrapperSpec),
}

/// A lowered directive, still carrying where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub kind: DirectiveKind,
    pub line: usize,
    pub rule: Rule,
}
