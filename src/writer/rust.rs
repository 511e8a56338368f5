//! Rust bindings for wrapper mode.
//!
//! In grovel mode the probe writes the bindings itself, starting with the
//! same banner (see `cgrovel_banner` in `support/cgrovel.h`).

use std::fmt::{self, Write as _};
use std::io;
use std::path::Path;

use crate::model::{BuildContext, Declaration, ForeignFunction};

pub const BANNER: &str =
    "// This file has been automatically generated by cgrovel.\n// Do not edit it by hand.\n\n";

/// Where the shim library ends up, recorded in the `library` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryInfo {
    /// Link name, without `lib` prefix or extension.
    pub name: String,
    pub search_path: String,
    pub file: String,
}

pub fn render(ctx: &BuildContext, library: &LibraryInfo) -> Result<String, fmt::Error> {
    let mut out = String::from(BANNER);
    writeln!(out, "pub mod library {{")?;
    writeln!(out, "    pub const NAME: &str = {:?};", library.name)?;
    writeln!(out, "    pub const SEARCH_PATH: &str = {:?};", library.search_path)?;
    writeln!(out, "    pub const FILE: &str = {:?};", library.file)?;
    writeln!(out, "}}")?;

    let mut in_module = false;
    for declaration in ctx.declarations() {
        match declaration {
            Declaration::Namespace(name) => {
                if in_module {
                    writeln!(out, "}}")?;
                }
                writeln!(out)?;
                writeln!(out, "pub mod {name} {{")?;
                in_module = true;
            }
            Declaration::Function(function) => {
                let indent = if in_module { "    " } else { "" };
                writeln!(out)?;
                extern_block(&mut out, indent, &library.name, function)?;
            }
        }
    }
    if in_module {
        writeln!(out, "}}")?;
    }
    Ok(out)
}

fn extern_block(out: &mut String, indent: &str, link: &str, f: &ForeignFunction) -> fmt::Result {
    writeln!(out, "{indent}#[link(name = {link:?})]")?;
    writeln!(out, "{indent}unsafe extern {:?} {{", f.abi)?;
    if let Some(doc) = &f.documentation {
        for line in doc.lines() {
            if line.is_empty() {
                writeln!(out, "{indent}    ///")?;
            } else {
                writeln!(out, "{indent}    /// {line}")?;
            }
        }
    }
    writeln!(out, "{indent}    #[link_name = {:?}]", f.symbol)?;
    let params = f
        .params
        .iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    match &f.ret {
        Some(ret) => writeln!(out, "{indent}    pub fn {}({params}) -> {ret};", f.name)?,
        None => writeln!(out, "{indent}    pub fn {}({params});", f.name)?,
    }
    writeln!(out, "{indent}}}")
}

pub fn emit(ctx: &BuildContext, library: &LibraryInfo, path: &Path) -> io::Result<()> {
    let text = render(ctx, library).map_err(io::Error::other)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> LibraryInfo {
        LibraryInfo {
            name: "sysmacros".into(),
            search_path: "/tmp/out".into(),
            file: "libsysmacros.so".into(),
        }
    }

    fn major() -> ForeignFunction {
        ForeignFunction {
            name: "major".into(),
            symbol: "major_wrap".into(),
            abi: "C",
            params: vec![("dev".into(), "::core::ffi::c_ulong".into())],
            ret: Some("::core::ffi::c_uint".into()),
            documentation: Some("Major device number.".into()),
        }
    }

    #[test]
    fn top_level_functions() {
        let mut ctx = BuildContext::new();
        ctx.push_declaration(Declaration::Function(major()));
        let out = render(&ctx, &library()).unwrap();
        let expected = format!(
            "{BANNER}pub mod library {{
    pub const NAME: &str = \"sysmacros\";
    pub const SEARCH_PATH: &str = \"/tmp/out\";
    pub const FILE: &str = \"libsysmacros.so\";
}}

#[link(name = \"sysmacros\")]
unsafe extern \"C\" {{
    /// Major device number.
    #[link_name = \"major_wrap\"]
    pub fn major(dev: ::core::ffi::c_ulong) -> ::core::ffi::c_uint;
}}
"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn namespaces_nest_following_functions() {
        let mut ctx = BuildContext::new();
        ctx.push_declaration(Declaration::Namespace("a".into()));
        ctx.push_declaration(Declaration::Function(ForeignFunction {
            ret: None,
            documentation: None,
            abi: "system",
            ..major()
        }));
        ctx.push_declaration(Declaration::Namespace("b".into()));
        let out = render(&ctx, &library()).unwrap();

        assert!(out.contains(
            "\npub mod a {\n\n    #[link(name = \"sysmacros\")]\n    unsafe extern \"system\" {\n"
        ));
        assert!(out.contains(
            "        pub fn major(dev: ::core::ffi::c_ulong);\n    }\n}\n\npub mod b {\n}\n"
        ));
        assert!(out.ends_with("}\n"));
    }
}
