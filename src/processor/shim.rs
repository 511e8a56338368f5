//! Forwarding shims for wrapper mode.

use std::fmt::{self, Write};

use super::Session;
use super::ast::{WrapperBody, WrapperSpec};
use crate::model::{Declaration, ForeignFunction};

/// Emit `<ret> <native>_wrap(<params>) { ... }` and record the matching
/// Rust declaration in the session's context.
pub fn wrapper(spec: &WrapperSpec, session: &mut Session, out: &mut String) -> fmt::Result {
    let params = if spec.params.is_empty() {
        "void".to_string()
    } else {
        spec.params
            .iter()
            .map(|(name, ty)| format!("{} {name}", ty.c_name()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    writeln!(out, "{} {}({params})", spec.ret.c_name(), spec.symbol())?;
    writeln!(out, "{{")?;
    match &spec.body {
        WrapperBody::Forward => {
            let args = spec
                .params
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if spec.ret.is_void() {
                writeln!(out, "  {}({args});", spec.native)?;
            } else {
                writeln!(out, "  return {}({args});", spec.native)?;
            }
        }
        WrapperBody::Raw(statements) => {
            for statement in statements {
                writeln!(out, "  {statement}")?;
            }
        }
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    let here = session.namespace();
    let function = ForeignFunction {
        name: spec.name.clone(),
        symbol: spec.symbol(),
        abi: spec.convention.abi(),
        params: spec
            .params
            .iter()
            .map(|(name, ty)| (name.clone(), ty.rust_name(here)))
            .collect(),
        ret: (!spec.ret.is_void()).then(|| spec.ret.rust_name(here)),
        documentation: spec.documentation.clone(),
    };
    session
        .context
        .push_declaration(Declaration::Function(function));
    Ok(())
}
