//! Renders lowered rules into C text.
//!
//! Probe rules produce calls into `cgrovel.h`; the probe performs every
//! `sizeof`/`offsetof` itself, including the element count of auto slots.
//! Nothing here knows a layout.

use std::fmt::{self, Write};

use log::{debug, warn};

use super::Session;
use super::ast::*;
use super::registry::Mode;
use super::shim;
use super::types::c_string;
use crate::error::GenerateError;
use crate::model::Declaration;
use crate::toolchain;

const INDENT: &str = "  ";

fn doc_arg(doc: Option<&str>) -> String {
    doc.map_or_else(|| "NULL".to_string(), c_string)
}

/// Render one rule, updating the session's context as a side effect.
pub fn emit(
    lowered: &Lowered,
    session: &mut Session,
    out: &mut String,
) -> Result<(), GenerateError> {
    match &lowered.rule {
        Rule::RawC(lines) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        Rule::Include(headers) => {
            for header in headers {
                writeln!(out, "#include <{header}>")?;
            }
        }
        Rule::Define { name, value } => match value {
            Some(value) => writeln!(out, "#define {name} {value}")?,
            None => writeln!(out, "#define {name}")?,
        },
        Rule::Typedef { base, alias } => writeln!(out, "typedef {base} {alias};")?,
        Rule::Flags(flags) => session.context.add_flags(flags.iter().cloned()),
        Rule::PkgConfig { packages, optional } => {
            pkg_config(lowered.line, packages, *optional, session)?
        }
        Rule::Namespace(name) => namespace(name, session, out)?,
        Rule::Constant(spec) => constant(spec, out)?,
        Rule::CType {
            name,
            native,
            documentation,
        } => writeln!(
            out,
            "{INDENT}cgrovel_ctype(output, {}, {native}, {});",
            c_string(name),
            doc_arg(documentation.as_deref())
        )?,
        Rule::Record(spec) => record(spec, session.namespace(), out)?,
        Rule::Enum(spec) => enumeration(spec, session.namespace(), out)?,
        Rule::Wrapper(spec) => shim::wrapper(spec, session, out)?,
    }
    Ok(())
}

fn pkg_config(
    line: usize,
    packages: &[String],
    optional: bool,
    session: &mut Session,
) -> Result<(), GenerateError> {
    match toolchain::pkg_config_cflags(packages) {
        Ok(flags) => {
            debug!("pkg-config {}: {}", packages.join(" "), flags.join(" "));
            session.context.add_flags(flags);
            Ok(())
        }
        Err(err) if optional => {
            warn!("skipping optional pkg-config packages {}: {err}", packages.join(" "));
            Ok(())
        }
        Err(err) => Err(GenerateError::PkgConfig {
            line,
            packages: packages.join(" "),
            message: err.to_string(),
        }),
    }
}

fn namespace(name: &str, session: &mut Session, out: &mut String) -> fmt::Result {
    match session.mode {
        Mode::Grovel => {
            if session.namespace().is_some() {
                writeln!(out, "{INDENT}cgrovel_namespace_end(output);")?;
            }
            writeln!(out, "{INDENT}cgrovel_namespace_begin(output, {});", c_string(name))?;
        }
        Mode::Wrapper => session
            .context
            .push_declaration(Declaration::Namespace(name.to_string())),
    }
    session.enter_namespace(name);
    Ok(())
}

/// Close the module left open by the last `in-namespace`, if any.
pub fn close_namespace(session: &Session, out: &mut String) -> fmt::Result {
    if session.namespace().is_some() {
        writeln!(out, "{INDENT}cgrovel_namespace_end(output);")?;
    }
    Ok(())
}

/// `#if defined(c1)` / `#elif defined(c2)` ... one `emit` per branch.
fn candidate_chain<F>(
    candidates: &[String],
    optional: bool,
    missing_name: &str,
    out: &mut String,
    mut branch: F,
) -> fmt::Result
where
    F: FnMut(&str, &mut String) -> fmt::Result,
{
    for (i, candidate) in candidates.iter().enumerate() {
        let directive = if i == 0 { "#if" } else { "#elif" };
        writeln!(out, "{directive} defined({candidate})")?;
        branch(candidate, out)?;
    }
    if !optional {
        writeln!(out, "#else")?;
        writeln!(out, "{INDENT}cgrovel_missing(output, {});", c_string(missing_name))?;
    }
    writeln!(out, "#endif")
}

pub fn constant(spec: &ConstantSpec, out: &mut String) -> fmt::Result {
    let helper = match spec.ty {
        ConstantType::Integer => "cgrovel_constant",
        ConstantType::Double => "cgrovel_constant_double",
    };
    let name = c_string(&spec.name);
    let doc = doc_arg(spec.documentation.as_deref());
    candidate_chain(&spec.candidates, spec.optional, &spec.name, out, |macro_name, out| {
        writeln!(out, "{INDENT}{helper}(output, {name}, {macro_name}, {doc});")
    })
}

pub fn record(spec: &RecordSpec, namespace: Option<&str>, out: &mut String) -> fmt::Result {
    let (begin, fixed, auto) = match spec.kind {
        RecordKind::Struct => ("cgrovel_struct_begin", "cgrovel_slot", "cgrovel_slot_auto"),
        RecordKind::Union => (
            "cgrovel_union_begin",
            "cgrovel_union_slot",
            "cgrovel_union_slot_auto",
        ),
    };
    let native = &spec.native;

    writeln!(
        out,
        "{INDENT}{begin}(output, {}, {native}, {});",
        c_string(&spec.name),
        doc_arg(spec.documentation.as_deref())
    )?;
    for slot in &spec.slots {
        let name = c_string(&slot.name);
        let rtype = c_string(&slot.ty.rust_name(namespace));
        let field = &slot.native;
        match &slot.count {
            SlotCount::Auto => {
                writeln!(out, "{INDENT}{auto}(output, {native}, {field}, {name}, {rtype});")?
            }
            SlotCount::Fixed(n) => writeln!(
                out,
                "{INDENT}{fixed}(output, {native}, {field}, {name}, {rtype}, {n});"
            )?,
            SlotCount::Named(expr) => writeln!(
                out,
                "{INDENT}{fixed}(output, {native}, {field}, {name}, {rtype}, ({expr}));"
            )?,
        }
    }
    writeln!(out, "{INDENT}cgrovel_record_end(output);")
}

pub fn enumeration(spec: &EnumSpec, namespace: Option<&str>, out: &mut String) -> fmt::Result {
    writeln!(
        out,
        "{INDENT}cgrovel_enum_begin(output, {}, {}, {});",
        c_string(&spec.name),
        c_string(&spec.base.rust_name(namespace)),
        doc_arg(spec.documentation.as_deref())
    )?;

    for member in &spec.members {
        let name = c_string(&member.name);
        let doc = doc_arg(member.documentation.as_deref());
        let line = |native: &str, out: &mut String| {
            writeln!(out, "{INDENT}cgrovel_enum_member(output, {name}, {native}, {doc});")
        };
        if spec.macro_members {
            let missing = format!("{}::{}", spec.name, member.name);
            candidate_chain(&member.candidates, member.optional, &missing, out, line)?;
        } else if member.optional {
            writeln!(out, "#ifdef {}", member.candidates[0])?;
            line(&member.candidates[0], out)?;
            writeln!(out, "#endif")?;
        } else {
            line(&member.candidates[0], out)?;
        }
    }
    writeln!(out, "{INDENT}cgrovel_enum_end(output);")?;

    if spec.define_constants {
        // The member chain above already reports a missing definition.
        for member in &spec.members {
            constant(
                &ConstantSpec {
                    name: member.name.clone(),
                    candidates: member.candidates.clone(),
                    documentation: member.documentation.clone(),
                    optional: true,
                    ty: ConstantType::Integer,
                },
                out,
            )?;
        }
    }
    Ok(())
}
