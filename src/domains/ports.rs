use crate::common::DomainResult;
use crate::domains::level::LevelInfo;

/// Where level descriptions come from.
pub trait LevelDataSource: Send + Sync {
    fn load_level(&self, name: &str) -> DomainResult<LevelInfo>;

    /// Names `load_level` accepts, sorted.
    fn list_levels(&self) -> DomainResult<Vec<String>>;
}
