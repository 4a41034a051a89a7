use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub source_dir: PathBuf,
    pub duckdb_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SourceFiles {
    pub population: PathBuf,
    pub claims: PathBuf,
}

impl StoragePaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir: PathBuf = data_dir.into();
        let source_dir = data_dir.join("source");
        let duckdb_path = data_dir.join("cms.duckdb");

        Self {
            source_dir,
            duckdb_path,
        }
    }

    pub fn source_files(&self) -> SourceFiles {
        SourceFiles {
            population: self.source_dir.join("cmspop.csv"),
            claims: self.source_dir.join("cmsclaims.csv"),
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.source_dir)?;
        Ok(())
    }
}

pub fn file_present_nonempty(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(m) => m.is_file() && m.len() > 0,
        Err(_) => false,
    }
}
