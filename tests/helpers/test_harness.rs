use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tsimport::{Config, ImportEngine};

pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: Config,
}

impl TestHarness {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.scan.parallel_threads = Some(2);

        Ok(Self { temp_dir, config })
    }

    pub fn create_test_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.temp_dir.path().join(path))?)
    }

    pub fn remove_file(&self, path: &str) -> Result<()> {
        std::fs::remove_file(self.temp_dir.path().join(path))?;
        Ok(())
    }

    /// Engine over the harness directory with the harness config
    pub fn engine(&self) -> Result<Arc<ImportEngine>> {
        Ok(Arc::new(ImportEngine::new(self.path(), self.config.clone())?))
    }

    /// Engine whose index has already been built
    pub async fn indexed_engine(&self) -> Result<Arc<ImportEngine>> {
        let engine = self.engine()?;
        engine.reindex(false).await?;
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
