//! Write generated C source to disk.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;

/// Overwrites `path`; generated files are never merged with old contents.
pub fn emit(source: &str, path: &Path) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(source.as_bytes())?;
    if !source.ends_with('\n') {
        writeln!(file)?;
    }
    file.flush()?;
    debug!("wrote {} bytes of C to {}", source.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_and_terminates_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.c");
        std::fs::write(&path, "stale contents that are longer than the new ones").unwrap();
        emit("int x;", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int x;\n");
    }
}
