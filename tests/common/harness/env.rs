//! Isolated test environment with temp directory.

use super::RoamCommand;
use anyhow::Result;
use roamlinks::index::{IndexBuilder, LinkIndex};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary workspace.
///
/// The workspace and a private config directory live in one temp directory
/// that is removed on drop.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Path to the workspace holding the Markdown files
    notes_dir: PathBuf,
    /// Stand-in for the user's config directory
    config_dir: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment with an empty workspace.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let notes_dir = temp_dir.path().join("notes");
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&notes_dir).expect("Failed to create notes directory");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config directory");
        let notes_dir = notes_dir
            .canonicalize()
            .expect("Failed to resolve notes directory");
        Self {
            _temp_dir: temp_dir,
            notes_dir,
            config_dir,
        }
    }

    /// Returns the path to the workspace.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Returns the directory the binary reads its config from.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Writes a note relative to the workspace, creating parent directories.
    pub fn add_note(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.notes_dir.join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create note directory");
        }
        std::fs::write(&path, content).expect("Failed to write test note");
        path
    }

    /// Writes `config.toml` for the binary run by [`TestEnv::cmd`].
    pub fn write_config(&self, content: &str) -> PathBuf {
        let dir = self.config_dir.join("roamlinks");
        std::fs::create_dir_all(&dir).expect("Failed to create config directory");
        let path = dir.join("config.toml");
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    /// Builds the in-memory index for the workspace.
    pub fn build_index(&self) -> Result<LinkIndex> {
        let result = IndexBuilder::new(&self.notes_dir).build()?;
        Ok(result.index)
    }

    /// Path for a snapshot file outside the workspace.
    pub fn snapshot_path(&self) -> PathBuf {
        self.config_dir.join("index.json")
    }

    /// Creates a RoamCommand configured for this test environment.
    pub fn cmd(&self) -> RoamCommand {
        RoamCommand::new()
            .config_home(&self.config_dir)
            .dir(&self.notes_dir)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creates_workspace() {
        let env = TestEnv::new();
        assert!(env.notes_dir().is_dir(), "workspace should exist");
        assert!(env.config_dir().is_dir(), "config directory should exist");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.notes_dir().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_add_note_creates_parents() {
        let env = TestEnv::new();
        let path = env.add_note("deep/nested/note.md", "[[x]]");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[[x]]");
    }

    #[test]
    fn test_env_build_index_sees_notes() {
        let env = TestEnv::new();
        env.add_note("a.md", "[[b]]");
        env.add_note("b.md", "");

        let index = env.build_index().expect("Should build index");
        assert_eq!(index.len(), 2);
        assert_eq!(index.note("a.md").unwrap().outlinks, vec!["b".to_string()]);
    }
}
