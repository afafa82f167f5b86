//! Runtime configuration, built once from the command line and environment

use crate::error::{Error, Result};
use crate::output::OutputMode;
use std::path::{Path, PathBuf};

/// Default checkout used when `XMAGE_MASTER` is unset
pub const DEFAULT_MASTER: &str = "/opt/git/github.com/magefree/mage/master";

pub const SCRYFALL_API_URL: &str = "https://api.scryfall.com";

/// Location of the set classes relative to the repository root
pub const SETS_PATH: &str = "Mage.Sets/src/mage/sets";

#[derive(Debug, Clone)]
pub struct Config {
    /// Checkout inspected by every read-only subcommand
    pub master: PathBuf,
    /// Checkout rewritten by `change-set-code`
    pub stage: Option<PathBuf>,
    pub scryfall_url: String,
    pub output: OutputMode,
    pub verbose: bool,
}

impl Config {
    pub fn new(master: impl Into<PathBuf>) -> Self {
        Self {
            master: master.into(),
            stage: None,
            scryfall_url: SCRYFALL_API_URL.to_string(),
            output: OutputMode::Clipboard,
            verbose: false,
        }
    }

    pub fn sets_dir(&self) -> PathBuf {
        self.master.join(SETS_PATH)
    }

    pub fn stage_dir(&self) -> Result<&Path> {
        self.stage.as_deref().ok_or_else(|| {
            Error::Config("XMAGE_STAGE must be set (or --stage given) for this subcommand".into())
        })
    }

    pub fn stage_sets_dir(&self) -> Result<PathBuf> {
        Ok(self.stage_dir()?.join(SETS_PATH))
    }

    /// Resolve a set directory argument; relative paths are taken from the stage sets dir
    pub fn resolve_stage_set_dir(&self, set_dir: &Path) -> Result<PathBuf> {
        let sets_dir = self.stage_sets_dir()?;
        if set_dir.is_absolute() {
            Ok(set_dir.to_path_buf())
        } else {
            Ok(sets_dir.join(set_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_dir_under_master() {
        let config = Config::new("/repo");
        assert_eq!(config.sets_dir(), PathBuf::from("/repo/Mage.Sets/src/mage/sets"));
    }

    #[test]
    fn test_stage_required() {
        let config = Config::new("/repo");
        assert!(matches!(config.stage_dir(), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_stage_set_dir() {
        let mut config = Config::new("/repo");
        config.stage = Some(PathBuf::from("/stage"));

        assert_eq!(
            config.resolve_stage_set_dir(Path::new("dominaria")).unwrap(),
            PathBuf::from("/stage/Mage.Sets/src/mage/sets/dominaria")
        );
        assert_eq!(
            config.resolve_stage_set_dir(Path::new("/elsewhere/dom")).unwrap(),
            PathBuf::from("/elsewhere/dom")
        );
    }
}
