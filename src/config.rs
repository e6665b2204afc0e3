//! Client configuration.
//!
//! The store credentials are treated as an opaque blob by the core: only the
//! transport implementation interprets them.

use serde::{Deserialize, Serialize};

use crate::error::{DriveError, Result};

/// Credentials for the remote store transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Base URL of the store's command endpoint.
    pub endpoint: String,
    /// Bearer token presented on every request.
    pub token: String,
}

/// Configuration for a [`Drive`](crate::Drive) instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Identifier of the folder to mount as `/`.
    pub root_id: String,
    /// Transport credentials.
    pub credentials: Credentials,
}

impl DriveConfig {
    /// Create a configuration from its parts.
    pub fn new(root_id: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            root_id: root_id.into(),
            credentials,
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| DriveError::InvalidPath(format!("read error: {}", e)))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the configuration to a JSON file.
    ///
    /// The file contains the credentials in the clear - keep it secure!
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| DriveError::InvalidPath(format!("write error: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.json");

        let config = DriveConfig::new(
            "root123",
            Credentials {
                endpoint: "https://store.example.com/cmd".to_string(),
                token: "tok".to_string(),
            },
        );
        config.save(&path).unwrap();

        let loaded = DriveConfig::from_file(&path).unwrap();
        assert_eq!(loaded.root_id, "root123");
        assert_eq!(loaded.credentials.endpoint, "https://store.example.com/cmd");
        assert_eq!(loaded.credentials.token, "tok");
    }

    #[test]
    fn test_missing_file() {
        assert!(DriveConfig::from_file("/nonexistent/drive.json").is_err());
    }
}
