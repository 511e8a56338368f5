//! Foreign type references and the mapping of spec names onto Rust names.

use crate::model::{Form, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Size,
    SSize,
    Float,
    Double,
    Pointer,
    String,
    Void,
}

impl Primitive {
    /// Keyword spelling, C spelling, Rust spelling.
    const TABLE: &'static [(&'static str, Primitive, &'static str, &'static str)] = &[
        ("char", Primitive::Char, "char", "::core::ffi::c_char"),
        ("uchar", Primitive::UChar, "unsigned char", "::core::ffi::c_uchar"),
        ("short", Primitive::Short, "short", "::core::ffi::c_short"),
        ("ushort", Primitive::UShort, "unsigned short", "::core::ffi::c_ushort"),
        ("int", Primitive::Int, "int", "::core::ffi::c_int"),
        ("uint", Primitive::UInt, "unsigned int", "::core::ffi::c_uint"),
        ("long", Primitive::Long, "long", "::core::ffi::c_long"),
        ("ulong", Primitive::ULong, "unsigned long", "::core::ffi::c_ulong"),
        ("llong", Primitive::LongLong, "long long", "::core::ffi::c_longlong"),
        ("ullong", Primitive::ULongLong, "unsigned long long", "::core::ffi::c_ulonglong"),
        ("int8", Primitive::Int8, "int8_t", "i8"),
        ("uint8", Primitive::UInt8, "uint8_t", "u8"),
        ("int16", Primitive::Int16, "int16_t", "i16"),
        ("uint16", Primitive::UInt16, "uint16_t", "u16"),
        ("int32", Primitive::Int32, "int32_t", "i32"),
        ("uint32", Primitive::UInt32, "uint32_t", "u32"),
        ("int64", Primitive::Int64, "int64_t", "i64"),
        ("uint64", Primitive::UInt64, "uint64_t", "u64"),
        ("size", Primitive::Size, "size_t", "usize"),
        ("ssize", Primitive::SSize, "ssize_t", "isize"),
        ("float", Primitive::Float, "float", "f32"),
        ("double", Primitive::Double, "double", "f64"),
        ("pointer", Primitive::Pointer, "void *", "*mut ::core::ffi::c_void"),
        ("string", Primitive::String, "char *", "*mut ::core::ffi::c_char"),
        ("void", Primitive::Void, "void", "()"),
    ];

    pub fn from_keyword(kw: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(name, ..)| *name == kw)
            .map(|(_, p, ..)| *p)
    }

    fn row(self) -> &'static (&'static str, Primitive, &'static str, &'static str) {
        // every variant has a row
        Self::TABLE
            .iter()
            .find(|(_, p, ..)| *p == self)
            .unwrap_or(&Self::TABLE[0])
    }

    pub fn c_name(self) -> &'static str {
        self.row().2
    }

    pub fn rust_name(self) -> &'static str {
        self.row().3
    }
}

/// A type as written in a slot, enum base or wrapper signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    Named(Symbol),
    Pointer(Box<TypeRef>),
}

impl TypeRef {
    /// `:int`, `time-t`, `ns::time-t` or `(:pointer T)`.
    pub fn parse(form: &Form) -> Result<Self, String> {
        match form {
            Form::Keyword(kw) => Primitive::from_keyword(kw)
                .map(TypeRef::Primitive)
                .ok_or_else(|| format!("unknown primitive type `:{kw}`")),
            Form::Symbol(sym) => Ok(TypeRef::Named(sym.clone())),
            Form::List(items) => match items.as_slice() {
                [Form::Keyword(kw), inner] if kw == "pointer" => {
                    Ok(TypeRef::Pointer(Box::new(TypeRef::parse(inner)?)))
                }
                _ => Err("type list must look like (:pointer TYPE)".to_string()),
            },
            other => Err(format!("expected a type, found {}", other.describe())),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive(Primitive::Void))
    }

    /// Spelling of the type in generated C.
    pub fn c_name(&self) -> String {
        match self {
            TypeRef::Primitive(p) => p.c_name().to_string(),
            TypeRef::Named(sym) => type_ident(&sym.name),
            TypeRef::Pointer(inner) => format!("{} *", inner.c_name()),
        }
    }

    /// Spelling of the type in Rust bindings emitted inside `current`.
    pub fn rust_name(&self, current: Option<&str>) -> String {
        match self {
            TypeRef::Primitive(p) => p.rust_name().to_string(),
            TypeRef::Named(sym) => rust_path(sym, current),
            TypeRef::Pointer(inner) => match inner.as_ref() {
                TypeRef::Primitive(Primitive::Void) => "*mut ::core::ffi::c_void".to_string(),
                inner => format!("*mut {}", inner.rust_name(current)),
            },
        }
    }
}

/// Path to `sym` from a module directly under the bindings root.
///
/// Namespaces are emitted as sibling `pub mod`s, so crossing from one to
/// another goes through `super`.
pub fn rust_path(sym: &Symbol, current: Option<&str>) -> String {
    let name = type_ident(&sym.name);
    match (sym.namespace.as_deref(), current) {
        (None, None) => name,
        (Some(target), Some(here)) if target == here => name,
        (None, Some(_)) => format!("super::{name}"),
        (Some(target), None) => format!("{target}::{name}"),
        (Some(target), Some(_)) => format!("super::{target}::{name}"),
    }
}

/// `time-t` → `time_t`.
pub fn type_ident(name: &str) -> String {
    name.replace('-', "_")
}

/// `+eagain+` → `EAGAIN`, `sock-stream` → `SOCK_STREAM`.
pub fn const_ident(name: &str) -> String {
    name.trim_matches(['+', '*'])
        .replace('-', "_")
        .to_ascii_uppercase()
}

pub fn is_rust_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Strict and reserved keywords of Rust 2024.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Escape `text` as the body of a C string literal.
pub fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for byte in text.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            other => out.push_str(&format!("\\{other:03o}")),
        }
    }
    out.push('"');
    out
}
