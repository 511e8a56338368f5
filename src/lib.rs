pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod toolchain;
pub mod writer;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

pub use config::Config;
pub use error::Error;
pub use processor::Mode;
pub use toolchain::Toolchain;

use model::Directive;
use writer::rust::LibraryInfo;

/// Paths of everything one run produces, derived from the input's stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub stem: String,
    pub dir: PathBuf,
    /// Generated C.
    pub source: PathBuf,
    /// Probe executable or shim library.
    pub binary: PathBuf,
    /// Generated Rust.
    pub bindings: PathBuf,
}

impl Artifacts {
    /// Outputs go to `out_dir`, or next to `input` when it is `None`.
    pub fn for_input(input: &Path, out_dir: Option<&Path>, mode: Mode) -> Result<Self, Error> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::io(
                    input,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "input has no file name"),
                )
            })?;
        let dir = match out_dir.or_else(|| input.parent()) {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let binary = match mode {
            Mode::Grovel => dir.join(executable_name(&stem)),
            Mode::Wrapper => dir.join(library_file_name(&stem)),
        };
        Ok(Self {
            source: dir.join(format!("{stem}.c")),
            bindings: dir.join(format!("{stem}.rs")),
            binary,
            stem,
            dir,
        })
    }
}

pub fn executable_name(stem: &str) -> String {
    if cfg!(windows) { format!("{stem}.exe") } else { stem.to_string() }
}

pub fn library_file_name(stem: &str) -> String {
    if cfg!(windows) {
        format!("{stem}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{stem}.dylib")
    } else {
        format!("lib{stem}.so")
    }
}

#[derive(Debug)]
pub struct GrovelReport {
    pub artifacts: Artifacts,
    /// Required definitions the probe could not find, in probe order.
    pub missing: Vec<String>,
}

#[derive(Debug)]
pub struct WrapperReport {
    pub artifacts: Artifacts,
    pub functions: usize,
}

fn read_directives(input: &Path) -> Result<Vec<Directive>, Error> {
    let text = std::fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    parser::load(&text).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })
}

fn write_source(source: &str, artifacts: &Artifacts) -> Result<(), Error> {
    std::fs::create_dir_all(&artifacts.dir).map_err(|e| Error::io(&artifacts.dir, e))?;
    writer::c::emit(source, &artifacts.source).map_err(|e| Error::io(&artifacts.source, e))
}

/// Generate, compile and run a probe; the probe writes the bindings.
///
/// Missing required definitions are not errors: they are logged and
/// returned in the report.
pub fn grovel(
    input: &Path,
    out_dir: Option<&Path>,
    toolchain: &Toolchain,
) -> Result<GrovelReport, Error> {
    let directives = read_directives(input)?;
    let (source, ctx) = processor::probe::generate(&directives)?;
    let artifacts = Artifacts::for_input(input, out_dir, Mode::Grovel)?;
    write_source(&source, &artifacts)?;

    info!("compiling probe {}", artifacts.binary.display());
    toolchain.compile_and_link(&artifacts.source, &artifacts.binary, ctx.flags(), false)?;

    info!("running probe, writing {}", artifacts.bindings.display());
    let missing = toolchain.run_probe(&artifacts.binary, &artifacts.bindings)?;
    for name in &missing {
        warn!("{}: missing definition: {name}", input.display());
    }
    Ok(GrovelReport { artifacts, missing })
}

/// Generate and link the shim library, then write its bindings.
pub fn wrap(
    input: &Path,
    out_dir: Option<&Path>,
    toolchain: &Toolchain,
) -> Result<WrapperReport, Error> {
    let directives = read_directives(input)?;
    let (source, ctx) = processor::wrapper::generate(&directives)?;
    let artifacts = Artifacts::for_input(input, out_dir, Mode::Wrapper)?;
    write_source(&source, &artifacts)?;

    info!("linking {}", artifacts.binary.display());
    toolchain.compile_and_link(&artifacts.source, &artifacts.binary, ctx.flags(), true)?;

    let search_path =
        std::fs::canonicalize(&artifacts.dir).map_err(|e| Error::io(&artifacts.dir, e))?;
    let library = LibraryInfo {
        name: artifacts.stem.clone(),
        search_path: search_path.to_string_lossy().into_owned(),
        file: library_file_name(&artifacts.stem),
    };
    writer::rust::emit(&ctx, &library, &artifacts.bindings)
        .map_err(|e| Error::io(&artifacts.bindings, e))?;

    let functions = ctx
        .declarations()
        .iter()
        .filter(|d| matches!(d, model::Declaration::Function(_)))
        .count();
    info!("wrote {functions} wrappers to {}", artifacts.bindings.display());
    Ok(WrapperReport { artifacts, functions })
}

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    // 1. ── Configure ──────────────────────────────────────────────────
    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| "Loading configuration")?,
        None => Config::default(),
    };
    let toolchain = Toolchain::from_env(&config);

    // 2. ── Generate, build, emit ──────────────────────────────────────
    match &args.command {
        cli::Command::Grovel { input, output } => {
            let report = grovel(input, output.as_deref(), &toolchain)
                .with_context(|| format!("Groveling {}", input.display()))?;
            if !report.missing.is_empty() {
                warn!("{} missing definition(s)", report.missing.len());
            }
            info!("bindings written to {}", report.artifacts.bindings.display());
        }
        cli::Command::Wrap { input, output } => {
            wrap(input, output.as_deref(), &toolchain)
                .with_context(|| format!("Wrapping {}", input.display()))?;
        }
    }

    Ok(())
}
