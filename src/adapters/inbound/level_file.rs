use crate::common::{DomainError, DomainResult};
use crate::domains::level::LevelInfo;
use crate::domains::ports::LevelDataSource;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `<base>/<name>.json` level descriptions.
pub struct FilesystemLevelSource {
    base: PathBuf,
}

impl FilesystemLevelSource {
    /// `base` falls back to `GEOFRIENDS_LEVEL_DIR`, then `resources/levels`.
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| {
            if let Ok(v) = env::var("GEOFRIENDS_LEVEL_DIR") {
                PathBuf::from(v)
            } else {
                let cwd_default = Path::new("resources/levels");
                if cwd_default.exists() {
                    cwd_default.to_path_buf()
                } else {
                    PathBuf::from("/usr/share/geofriends-planner/levels")
                }
            }
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn level_path(&self, name: &str) -> PathBuf {
        let file = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{}.json", name)
        };
        self.base.join(file)
    }

    /// Write a level so it can be loaded again under `name`.
    pub fn save_level(&self, name: &str, level: &LevelInfo) -> DomainResult<()> {
        if !self.base.exists() {
            fs::create_dir_all(&self.base).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        }
        let json = serde_json::to_string_pretty(level)?;
        fs::write(self.level_path(name), json).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        Ok(())
    }
}

impl LevelDataSource for FilesystemLevelSource {
    fn load_level(&self, name: &str) -> DomainResult<LevelInfo> {
        let path = self.level_path(name);
        let content = fs::read_to_string(&path)
            .map_err(|e| DomainError::InfrastructureError(format!("{}: {}", path.display(), e)))?;
        let mut level: LevelInfo = serde_json::from_str(&content)?;
        if level.name.is_none() {
            level.name = Some(name.trim_end_matches(".json").to_string());
        }
        level.counts.obstacles = level.obstacles.len();
        level.counts.rectangle_platforms = level.rectangle_platforms.len();
        level.counts.circle_platforms = level.circle_platforms.len();
        level.counts.collectibles = level.collectibles.len();
        Ok(level)
    }

    fn list_levels(&self) -> DomainResult<Vec<String>> {
        let entries = fs::read_dir(&self.base).map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}
