//! Output delivery for generated artifacts.
//!
//! Three modes: print to the console, rewrite the source file in place
//! (with a `.bak` backup alongside), or write a sibling file named after
//! the agent that produced it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use quillon_core::error::Result;
use quillon_core::types::OutputMode;

pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Deliver content according to the configured mode.
    ///
    /// Returns the path written, or `None` for console output. In-place
    /// writes copy the original to `<file>.bak` first.
    pub fn write(
        &self,
        file: &Path,
        content: &str,
        suffix: &str,
        title: &str,
    ) -> Result<Option<PathBuf>> {
        match self.mode {
            OutputMode::Console => {
                println!("\n=== {} ===\n", title);
                println!("{}", content);
                Ok(None)
            }
            OutputMode::InPlace => {
                let backup = backup_path(file);
                fs::copy(file, &backup)?;
                fs::write(file, normalize(content))?;
                info!(file = %file.display(), backup = %backup.display(), "wrote file in place");
                Ok(Some(file.to_path_buf()))
            }
            OutputMode::NewFile => {
                let target = derived_path(file, suffix);
                fs::write(&target, normalize(content))?;
                info!(file = %target.display(), "wrote new file");
                Ok(Some(target))
            }
        }
    }

    /// Write generated tests to `test_<stem>.py` next to the source file.
    /// Console mode prints instead.
    pub fn write_tests(&self, file: &Path, content: &str) -> Result<Option<PathBuf>> {
        match self.mode {
            OutputMode::Console => {
                println!("\n=== Generated Unit Tests ===\n");
                println!("{}", content);
                Ok(None)
            }
            _ => {
                let target = test_file_path(file);
                fs::write(&target, normalize(content))?;
                info!(file = %target.display(), "wrote generated tests");
                Ok(Some(target))
            }
        }
    }
}

fn normalize(content: &str) -> String {
    format!("{}\n", content.trim_end())
}

fn backup_path(file: &Path) -> PathBuf {
    PathBuf::from(format!("{}.bak", file.display()))
}

/// Sibling path `<stem>_<suffix>.py` in the same directory.
pub fn derived_path(file: &Path, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    file.with_file_name(format!("{}_{}.py", stem, suffix))
}

/// Sibling path `test_<stem>.py` in the same directory.
pub fn test_file_path(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    file.with_file_name(format!("test_{}.py", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_mode_writes_no_files() {
        let writer = OutputWriter::new(OutputMode::Console);
        let written = writer
            .write(Path::new("unused.py"), "content", "documented", "Title")
            .unwrap();
        assert!(written.is_none());
    }

    #[test]
    fn test_in_place_backs_up_then_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(&file, "original\n").unwrap();

        let writer = OutputWriter::new(OutputMode::InPlace);
        let written = writer
            .write(&file, "updated  \n\n", "documented", "Doc")
            .unwrap();

        assert_eq!(written.as_deref(), Some(file.as_path()));
        assert_eq!(fs::read_to_string(&file).unwrap(), "updated\n");
        let backup = dir.path().join("mod.py.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), "original\n");
    }

    #[test]
    fn test_new_file_mode_names_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(&file, "original\n").unwrap();

        let writer = OutputWriter::new(OutputMode::NewFile);
        let written = writer
            .write(&file, "migrated", "migrated", "Migration")
            .unwrap()
            .unwrap();

        assert_eq!(written, dir.path().join("mod_migrated.py"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "migrated\n");
        // Original untouched
        assert_eq!(fs::read_to_string(&file).unwrap(), "original\n");
    }

    #[test]
    fn test_generated_tests_go_to_test_prefixed_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calc.py");
        fs::write(&file, "def add(a, b): return a + b\n").unwrap();

        let writer = OutputWriter::new(OutputMode::NewFile);
        let written = writer.write_tests(&file, "def test_add(): pass").unwrap().unwrap();
        assert_eq!(written, dir.path().join("test_calc.py"));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(
            derived_path(Path::new("/tmp/demo/mod.py"), "refactored"),
            Path::new("/tmp/demo/mod_refactored.py")
        );
        assert_eq!(
            test_file_path(Path::new("/tmp/demo/mod.py")),
            Path::new("/tmp/demo/test_mod.py")
        );
    }
}
