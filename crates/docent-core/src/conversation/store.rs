//! Session persistence.
//!
//! Saves and restores [`ConversationContext`] snapshots as JSON files
//! in a flat directory layout:
//!
//! ```text
//! base_dir/
//! └── sessions/
//!     ├── <session-id-1>.json
//!     └── <session-id-2>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::context::ConversationContext;
use crate::error::{DocentError, Result};

/// Filesystem store for conversation sessions.
pub struct SessionStore {
    base_dir: PathBuf,
}

impl SessionStore {
    /// Opens a store rooted at `base_dir`, creating the directory
    /// layout if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("sessions"))?;
        Ok(Self { base_dir })
    }

    fn session_file_path(&self, session_id: &str) -> PathBuf {
        self.base_dir
            .join("sessions")
            .join(format!("{}.json", session_id))
    }

    /// Writes a context snapshot to disk under its session id.
    ///
    /// # Errors
    ///
    /// Fails when the context carries no session id, or on
    /// serialization or filesystem errors.
    pub fn save_session(&self, context: &ConversationContext) -> Result<PathBuf> {
        let session_id = context.session_id.as_deref().ok_or_else(|| {
            DocentError::precondition("save_session", "context has no session_id")
        })?;

        let file_path = self.session_file_path(session_id);
        let json = serde_json::to_string_pretty(context)?;
        fs::write(&file_path, json)?;

        tracing::debug!("Saved session {} to {:?}", session_id, file_path);
        Ok(file_path)
    }

    /// Loads a context snapshot by session id.
    ///
    /// # Errors
    ///
    /// Returns [`DocentError::NotFound`] for an unknown id, or an
    /// error if the file cannot be read or parsed.
    pub fn load_session(&self, session_id: &str) -> Result<ConversationContext> {
        let file_path = self.session_file_path(session_id);
        if !file_path.exists() {
            return Err(DocentError::not_found("session", session_id));
        }

        let json = fs::read_to_string(&file_path)?;
        let context: ConversationContext = serde_json::from_str(&json)?;
        Ok(context)
    }

    /// Session ids of every stored session, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the sessions directory cannot be read.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        let sessions_dir = self.base_dir.join("sessions");
        let mut ids = Vec::new();

        for entry in fs::read_dir(&sessions_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Deletes a stored session.
    ///
    /// # Errors
    ///
    /// Returns [`DocentError::NotFound`] for an unknown id.
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let file_path = self.session_file_path(session_id);
        if !file_path.exists() {
            return Err(DocentError::not_found("session", session_id));
        }

        fs::remove_file(&file_path)?;
        tracing::debug!("Deleted session {}", session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationState;

    fn context(session_id: &str) -> ConversationContext {
        ConversationContext {
            session_id: Some(session_id.to_string()),
            current_state: ConversationState::Engaged,
            current_unit_index: 3,
            total_units: 9,
            ..ConversationContext::default()
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        store.save_session(&context("abc")).unwrap();
        let loaded = store.load_session("abc").unwrap();

        assert_eq!(loaded.current_state, ConversationState::Engaged);
        assert_eq!(loaded.current_unit_index, 3);
        assert_eq!(loaded.total_units, 9);
        assert_eq!(loaded.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_save_without_session_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        let err = store
            .save_session(&ConversationContext::default())
            .unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_load_missing_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        let err = store.load_session("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        store.save_session(&context("b")).unwrap();
        store.save_session(&context("a")).unwrap();
        assert_eq!(store.list_sessions().unwrap(), vec!["a", "b"]);

        store.delete_session("a").unwrap();
        assert_eq!(store.list_sessions().unwrap(), vec!["b"]);
        assert!(store.delete_session("a").unwrap_err().is_not_found());
    }
}
