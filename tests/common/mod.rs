#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory the persistence gateway should be rooted at.
    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// A small lead file exercising ragged multi-value cells, null tokens, and
/// free-text statuses.
pub const SAMPLE_LEADS_CSV: &str = "\
Full Name,Work Email,Organization,Lead Stage,Deal Size,Product Interest
Alice Miller,alice@acme.io; a.miller@acme.io,Acme,new,1200,widgets; gadgets
Bob Stone,bob@globex.com,Globex,contacted,nan,gadgets
Cara Velez,cara@initech.net,Initech,qualified,880,sprockets|widgets
Dan Ortiz,NULL,Hooli,closed-won,455,
";

pub fn sample_mapping_args() -> Vec<String> {
    vec![
        "--map".to_string(),
        "name=Full Name".to_string(),
        "--map".to_string(),
        "email=Work Email".to_string(),
        "--map".to_string(),
        "company=Organization".to_string(),
        "--map".to_string(),
        "status=Lead Stage".to_string(),
        "--map".to_string(),
        "value=Deal Size".to_string(),
        "--map".to_string(),
        "products=Product Interest".to_string(),
    ]
}
