#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// A CSV with `rows` data rows: numeric `a` and `b`, categorical `c`.
    pub fn numeric_csv(&self, name: &str, rows: usize) -> PathBuf {
        let mut contents = String::from("a,b,c\n");
        for i in 0..rows {
            contents.push_str(&format!("{},{},{}\n", i, (i * 2) as f64 + 0.5, ["x", "y", "z"][i % 3]));
        }
        self.write(name, &contents)
    }
}
