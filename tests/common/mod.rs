use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use cgrovel::{Config, Toolchain};

pub fn toolchain() -> Toolchain {
    Toolchain::from_env(&Config::default())
}

pub fn cc_available() -> bool {
    Command::new(toolchain().compiler())
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

pub fn write_spec(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap_or_else(|err| panic!("write {}: {err}", path.display()));
    path
}

/// Compile and run a standalone C program, returning its stdout.
#[allow(dead_code)]
pub fn run_c(dir: &Path, name: &str, source: &str, extra: &[&str]) -> String {
    let src = write_spec(dir, &format!("{name}.c"), source);
    let exe = dir.join(name);
    let status = Command::new(toolchain().compiler())
        .arg("-o")
        .arg(&exe)
        .arg(&src)
        .args(extra)
        .status()
        .expect("spawn compiler");
    assert!(status.success(), "compiling {name}.c failed");
    let out = Command::new(&exe)
        .env("LD_LIBRARY_PATH", dir)
        .output()
        .expect("run helper");
    assert!(out.status.success(), "{name} failed");
    String::from_utf8(out.stdout).expect("utf-8 output")
}

/// Value of `pub const NAME: T = VALUE;` from generated bindings.
#[allow(dead_code)]
pub fn const_value<'a>(bindings: &'a str, name: &str) -> Option<&'a str> {
    bindings.lines().find_map(|line| {
        let rest = line.trim().strip_prefix(&format!("pub const {name}: "))?;
        let (_, value) = rest.split_once(" = ")?;
        value.strip_suffix(';')
    })
}

/// Body of `impl NAME { ... }` from generated bindings.
#[allow(dead_code)]
pub fn impl_block<'a>(bindings: &'a str, name: &str) -> &'a str {
    let start = bindings
        .find(&format!("impl {name} {{"))
        .unwrap_or_else(|| panic!("no impl block for {name}"));
    let len = bindings[start..]
        .find("\n}\n")
        .unwrap_or_else(|| panic!("impl block for {name} is not closed"));
    &bindings[start..start + len]
}
