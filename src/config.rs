//! Configuration types for resume-optimizer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default deadline for upload and export calls
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(120_000);

/// Analysis service endpoint settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the analysis service, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the upload endpoint (default: "/upload")
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TCP connect timeout (default: 30 seconds)
    ///
    /// Independent of the per-call deadlines; a refused or unreachable host is
    /// reported as an unknown transport fault rather than a timeout.
    #[serde(default = "default_connect_timeout", with = "duration_ms_serde")]
    pub connect_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Full URL of the upload endpoint
    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    /// Resolve an artifact reference returned by the service
    ///
    /// Absolute references are used as-is, relative ones are joined to the base URL.
    pub fn artifact_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            join_url(&self.base_url, reference)
        }
    }
}

/// Per-operation deadlines
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeadlineConfig {
    /// Upload and analysis deadline in milliseconds (default: 120000)
    #[serde(default = "default_deadline", with = "duration_ms_serde")]
    pub upload: Duration,

    /// Optimized document download deadline in milliseconds (default: 120000)
    #[serde(default = "default_deadline", with = "duration_ms_serde")]
    pub export: Duration,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            upload: DEFAULT_DEADLINE,
            export: DEFAULT_DEADLINE,
        }
    }
}

/// Input validation limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Largest accepted resume in bytes (default: 10 MiB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

/// Where exported documents are written
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// File collision handling
    #[serde(default)]
    pub file_collision: FileCollisionAction,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            file_collision: FileCollisionAction::default(),
        }
    }
}

/// File collision handling when saving an exported document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCollisionAction {
    /// Append (1), (2), etc. to filename (default)
    #[default]
    Rename,
    /// Overwrite existing file
    Overwrite,
    /// Skip the file, keep existing
    Skip,
}

/// Main configuration for the resume workflow
///
/// Every section has defaults, so an empty TOML document is a valid configuration:
///
/// ```toml
/// [service]
/// base_url = "http://127.0.0.1:5000"
///
/// [deadlines]
/// upload = 90000
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis service endpoint
    #[serde(default)]
    pub service: ServiceConfig,

    /// Upload and export deadlines
    #[serde(default)]
    pub deadlines: DeadlineConfig,

    /// Input validation limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Export destination
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&text)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.service.base_url).map_err(|e| Error::Config {
            message: format!("base_url '{}' is not a valid URL: {}", self.service.base_url, e),
            key: Some("service.base_url".to_string()),
        })?;

        if !self.service.upload_path.starts_with('/') {
            return Err(Error::Config {
                message: "upload_path must start with '/'".to_string(),
                key: Some("service.upload_path".to_string()),
            });
        }

        for (key, deadline) in [
            ("deadlines.upload", self.deadlines.upload),
            ("deadlines.export", self.deadlines.export),
        ] {
            if deadline.is_zero() {
                return Err(Error::Config {
                    message: "deadline must be greater than zero".to_string(),
                    key: Some(key.to_string()),
                });
            }
        }

        if self.validation.max_file_bytes == 0 {
            return Err(Error::Config {
                message: "max_file_bytes must be greater than zero".to_string(),
                key: Some("validation.max_file_bytes".to_string()),
            });
        }

        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_base_url() -> String {
    "https://resume-analyzer-jj0k.onrender.com".to_string()
}

fn default_upload_path() -> String {
    "/upload".to_string()
}

fn default_user_agent() -> String {
    concat!("resume-optimizer/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_deadline() -> Duration {
    DEFAULT_DEADLINE
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
