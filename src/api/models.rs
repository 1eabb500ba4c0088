//! Data models for the runtime API
//!
//! Field names follow the Docker Engine API's PascalCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Volume description returned by `GET /volumes/{name}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeInfo {
    /// Volume name
    pub name: String,
    /// Storage driver backing the volume
    pub driver: String,
    /// Absolute mount path inside the daemon's filesystem namespace
    pub mountpoint: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// User-defined labels
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    /// `local` or `global`
    #[serde(default)]
    pub scope: Option<String>,
    /// Driver-specific options
    #[serde(default)]
    pub options: Option<HashMap<String, String>>,
}

/// Error payload the runtime returns on non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable cause
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSPECT_JSON: &str = r#"{
        "CreatedAt": "2024-03-01T12:30:00Z",
        "Driver": "local",
        "Labels": { "com.example.app": "db" },
        "Mountpoint": "/var/lib/docker/volumes/pgdata/_data",
        "Name": "pgdata",
        "Options": {},
        "Scope": "local"
    }"#;

    #[test]
    fn test_volume_info_deserializes_inspect_payload() {
        let info: VolumeInfo = serde_json::from_str(INSPECT_JSON).unwrap();
        assert_eq!(info.name, "pgdata");
        assert_eq!(info.driver, "local");
        assert_eq!(info.mountpoint, "/var/lib/docker/volumes/pgdata/_data");
        assert_eq!(info.scope.as_deref(), Some("local"));
        assert_eq!(
            info.labels.unwrap().get("com.example.app").unwrap(),
            "db"
        );
        assert!(info.created_at.is_some());
    }

    #[test]
    fn test_volume_info_tolerates_missing_optional_fields() {
        let info: VolumeInfo = serde_json::from_str(
            r#"{"Name": "v", "Driver": "local", "Mountpoint": "/var/lib/docker/volumes/v/_data"}"#,
        )
        .unwrap();
        assert!(info.created_at.is_none());
        assert!(info.labels.is_none());
    }

    #[test]
    fn test_error_body() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "no such volume: nope"}"#).unwrap();
        assert!(body.message.contains("no such volume"));
    }
}
