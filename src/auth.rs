use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use directories::BaseDirs;
use serde::Deserialize;
use tracing::debug;

use crate::error::StudioError;

pub const TOKEN_ENV: &str = "STUDIO_DOCS_ACCESS_TOKEN";

pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Result<String, StudioError>;
}

#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String, StudioError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    token_path: PathBuf,
}

impl EnvTokenProvider {
    pub fn new() -> Result<Self, StudioError> {
        let token_path = BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("studio-docs").join("token.json"))
            .ok_or_else(|| {
                StudioError::Filesystem("unable to resolve config directory".to_string())
            })?;
        Ok(Self { token_path })
    }

    pub fn with_token_path(token_path: PathBuf) -> Self {
        Self { token_path }
    }

    pub fn token_path(&self) -> &PathBuf {
        &self.token_path
    }
}

impl TokenProvider for EnvTokenProvider {
    fn access_token(&self) -> Result<String, StudioError> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                debug!("using access token from {TOKEN_ENV}");
                return Ok(token.trim().to_string());
            }
        }
        if !self.token_path.exists() {
            return Err(StudioError::MissingToken(self.token_path.clone()));
        }
        let content = fs::read_to_string(&self.token_path)
            .map_err(|err| StudioError::TokenRead(err.to_string()))?;
        let file: TokenFile =
            serde_json::from_str(&content).map_err(|err| StudioError::TokenRead(err.to_string()))?;
        if file.access_token.trim().is_empty() {
            return Err(StudioError::MissingToken(self.token_path.clone()));
        }
        debug!(path = %self.token_path.display(), "using access token from file");
        Ok(file.access_token.trim().to_string())
    }
}

/// Resolves the inner provider on first use and reuses the token for the rest of the run.
pub struct LazyToken<P: TokenProvider> {
    provider: P,
    token: OnceLock<String>,
}

impl<P: TokenProvider> LazyToken<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            token: OnceLock::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.token.get().is_some()
    }
}

impl<P: TokenProvider> TokenProvider for LazyToken<P> {
    fn access_token(&self) -> Result<String, StudioError> {
        if let Some(token) = self.token.get() {
            return Ok(token.clone());
        }
        let token = self.provider.access_token()?;
        Ok(self.token.get_or_init(|| token).clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;

    struct CountingProvider {
        calls: Mutex<usize>,
    }

    impl TokenProvider for CountingProvider {
        fn access_token(&self) -> Result<String, StudioError> {
            let mut guard = self.calls.lock().unwrap();
            *guard += 1;
            Ok(format!("token-{guard}"))
        }
    }

    #[test]
    fn lazy_token_resolves_once() {
        let lazy = LazyToken::new(CountingProvider {
            calls: Mutex::new(0),
        });
        assert!(!lazy.is_resolved());
        assert_eq!(lazy.access_token().unwrap(), "token-1");
        assert_eq!(lazy.access_token().unwrap(), "token-1");
        assert_eq!(*lazy.provider.calls.lock().unwrap(), 1);
    }

    #[test]
    fn token_file_is_read() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("token.json");
        fs::write(&path, r#"{"access_token": " ya29.abc "}"#).unwrap();
        let provider = EnvTokenProvider::with_token_path(path);
        if std::env::var(TOKEN_ENV).is_err() {
            assert_eq!(provider.access_token().unwrap(), "ya29.abc");
        }
    }

    #[test]
    fn missing_token_file() {
        let temp = tempfile::tempdir().unwrap();
        let provider = EnvTokenProvider::with_token_path(temp.path().join("absent.json"));
        if std::env::var(TOKEN_ENV).is_err() {
            assert_matches!(provider.access_token(), Err(StudioError::MissingToken(_)));
        }
    }
}
