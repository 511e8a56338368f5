use std::path::PathBuf;

use thiserror::Error;

/// Problems found while turning the raw text of a specification file into forms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("line {line}: {message}")]
    Lex { line: usize, message: String },

    #[error("line {line}: unbalanced `(`")]
    Unclosed { line: usize },

    #[error("line {line}: unexpected `)`")]
    UnexpectedClose { line: usize },

    #[error("line {line}: top-level form must be a list headed by a directive name")]
    NotADirective { line: usize },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// A directive whose arguments do not match the shape its kind expects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: malformed `{directive}`: {message}")]
pub struct SpecError {
    pub line: usize,
    pub directive: String,
    pub message: String,
}

impl SpecError {
    pub fn new(line: usize, directive: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            directive: directive.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("cannot register unknown directive tag `{0}`")]
    UnknownTag(String),

    #[error("directive tag `{0}` registered twice")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("line {line}: unknown directive `{tag}`")]
    UnknownDirective { tag: String, line: usize },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("line {line}: pkg-config failed for {packages}: {message}")]
    PkgConfig {
        line: usize,
        packages: String,
        message: String,
    },

    #[error("formatting generated source failed")]
    Format(#[from] std::fmt::Error),
}

/// Failure of an external process (compiler, linker or probe).
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "`{command}` exited with {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}",
        describe_code(.code)
    )]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a pipeline run can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
