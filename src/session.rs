//! The signed-in user, persisted as `session.json` so that every command acts on the same ledger.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::User;
use crate::{utils, Result};
use anyhow::{ensure, Context};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads and writes the session file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Session {
    path: PathBuf,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the signed-in user, or `None` when signed out.
    pub async fn user(&self) -> Result<Option<User>> {
        self.read().await.pub_result(ErrorType::Config)
    }

    /// Returns the signed-in user or an error telling the caller to sign in.
    pub async fn require_user(&self) -> Result<User> {
        let user = self.user().await?;
        user.context("Nobody is signed in, run `ledger sign-in` first")
            .pub_result(ErrorType::Config)
    }

    /// Makes `user` the signed-in user, replacing any previous one.
    pub async fn sign_in(&self, user: &User) -> Result<()> {
        self.write(user).await.pub_result(ErrorType::Config)?;
        debug!("Signed in as '{}'", user.id);
        Ok(())
    }

    /// Signs out. Returns `false` if nobody was signed in.
    pub async fn sign_out(&self) -> Result<bool> {
        utils::remove_optional(&self.path)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn read(&self) -> Res<Option<User>> {
        match utils::read_optional(&self.path).await? {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("Unable to parse session at {}", self.path.display()))
                .map(Some),
        }
    }

    async fn write(&self, user: &User) -> Res<()> {
        ensure!(!user.id.trim().is_empty(), "The user id cannot be empty");
        let json = serde_json::to_string_pretty(user).context("Unable to serialize session")?;
        utils::write_atomic(&self.path, json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(dir.path().join("session.json"));
        assert!(session.user().await.unwrap().is_none());
        assert!(session.require_user().await.is_err());

        let user = User::new("42", "Lucas", "https://example.com/me.png");
        session.sign_in(&user).await.unwrap();
        assert_eq!(session.require_user().await.unwrap(), user);

        assert!(session.sign_out().await.unwrap());
        assert!(session.user().await.unwrap().is_none());
        assert!(!session.sign_out().await.unwrap());
    }

    #[tokio::test]
    async fn test_sign_in_requires_id() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(dir.path().join("session.json"));
        let err = session.sign_in(&User::new(" ", "Nobody", "")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
