//! Build invoker: drives the native C compiler, the probe and pkg-config.
//!
//! Every child is waited on synchronously with both streams captured. A
//! nonzero exit becomes [`BuildError::Failed`] carrying the full command line.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::{debug, trace};

use crate::config::Config;
use crate::error::BuildError;

/// Stderr prefix the probe uses for each absent required definition.
pub const MISSING_PREFIX: &str = "cgrovel: missing-definition: ";

/// Directory containing `cgrovel.h` as shipped with the crate.
pub fn default_support_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("support")
}

fn default_compiler() -> &'static str {
    if cfg!(windows) { "gcc" } else { "cc" }
}

fn default_word_size_flags() -> Vec<String> {
    if cfg!(target_arch = "x86_64") {
        vec!["-m64".into()]
    } else if cfg!(target_arch = "x86") {
        vec!["-m32".into()]
    } else {
        Vec::new()
    }
}

fn default_shared_library_flags() -> Vec<String> {
    let flags: &[&str] = if cfg!(target_os = "macos") {
        &["-dynamiclib"]
    } else if cfg!(windows) {
        &["-shared"]
    } else {
        &["-shared", "-fPIC"]
    };
    flags.iter().map(|f| f.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct Toolchain {
    compiler: OsString,
    word_size_flags: Vec<String>,
    shared_library_flags: Vec<String>,
    extra_flags: Vec<String>,
    support_dir: PathBuf,
}

impl Toolchain {
    /// `env_cc` is the value of `CC`, which takes precedence over the config.
    pub fn from_config(config: &Config, env_cc: Option<OsString>) -> Self {
        let compiler = env_cc
            .filter(|cc| !cc.is_empty())
            .or_else(|| config.compiler.clone().map(OsString::from))
            .unwrap_or_else(|| default_compiler().into());
        Self {
            compiler,
            word_size_flags: config
                .word_size_flags
                .clone()
                .unwrap_or_else(default_word_size_flags),
            shared_library_flags: config
                .shared_library_flags
                .clone()
                .unwrap_or_else(default_shared_library_flags),
            extra_flags: config.extra_flags.clone(),
            support_dir: config
                .support_dir
                .clone()
                .unwrap_or_else(default_support_dir),
        }
    }

    pub fn from_env(config: &Config) -> Self {
        Self::from_config(config, std::env::var_os("CC"))
    }

    pub fn compiler(&self) -> &OsStr {
        &self.compiler
    }

    fn compile_command(
        &self,
        source: &Path,
        output: &Path,
        flags: &[String],
        is_library: bool,
    ) -> Command {
        let mut cmd = Command::new(&self.compiler);
        cmd.args(&self.word_size_flags)
            .args(&self.extra_flags)
            .args(flags)
            .arg(format!("-I{}", self.support_dir.display()));
        if is_library {
            cmd.args(&self.shared_library_flags);
        }
        cmd.arg("-o").arg(output).arg(source);
        cmd
    }

    /// Compile `source` into an executable, or a shared library when
    /// `is_library` is set.
    pub fn compile_and_link(
        &self,
        source: &Path,
        output: &Path,
        flags: &[String],
        is_library: bool,
    ) -> Result<(), BuildError> {
        if is_library {
            // A library still mapped by a running process can refuse this;
            // the link below then reports the real problem.
            if let Err(err) = std::fs::remove_file(output) {
                trace!("not removing {}: {err}", output.display());
            }
        }
        run(self.compile_command(source, output, flags, is_library))?;
        Ok(())
    }

    /// Run a probe, which writes `bindings`, and collect the definitions it
    /// reported missing.
    pub fn run_probe(&self, executable: &Path, bindings: &Path) -> Result<Vec<String>, BuildError> {
        let mut cmd = Command::new(executable);
        cmd.arg(bindings);
        let output = run(cmd)?;
        Ok(parse_missing(&String::from_utf8_lossy(&output.stderr)))
    }
}

/// `cc -m64 -o out src.c`, as shown in logs and errors.
pub fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

fn run(mut cmd: Command) -> Result<Output, BuildError> {
    let command = command_line(&cmd);
    debug!("running {command}");
    let output = cmd.output().map_err(|source| BuildError::Spawn {
        command: command.clone(),
        source,
    })?;
    if !output.status.success() {
        return Err(BuildError::Failed {
            command,
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

/// Names from `cgrovel: missing-definition: NAME` lines, in order.
pub fn parse_missing(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter_map(|line| line.trim_end().strip_prefix(MISSING_PREFIX))
        .map(str::to_string)
        .collect()
}

/// `pkg-config --cflags PACKAGES...`, split on whitespace.
///
/// The executable can be overridden with `PKG_CONFIG`.
pub fn pkg_config_cflags(packages: &[String]) -> Result<Vec<String>, BuildError> {
    let program = std::env::var_os("PKG_CONFIG").unwrap_or_else(|| "pkg-config".into());
    let mut cmd = Command::new(program);
    cmd.arg("--cflags").args(packages);
    let output = run(cmd)?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .map(str::to_string)
        .collect())
}
