use std::path::{Path, PathBuf};

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `"json"` or `"compact"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { worker_threads: Some(2), log_format: default_log_format() }
    }
}

/// Where the flat-file collections and uploaded images live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: String::new(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_region_suffix")]
    pub region_suffix: String,
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            region_suffix: default_region_suffix(),
            timeout_secs: default_geocoder_timeout(),
        }
    }
}

/// Upload size and dimension limits, applied by `service::uploads::UploadPolicy`.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_profile_mb")]
    pub max_profile_mb: u32,
    #[serde(default = "default_max_image_mb")]
    pub max_image_mb: u32,
    #[serde(default = "default_max_image_dim")]
    pub max_image_dim: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_profile_mb: default_max_profile_mb(),
            max_image_mb: default_max_image_mb(),
            max_image_dim: default_max_image_dim(),
        }
    }
}

fn default_log_format() -> String { "compact".into() }
fn default_data_dir() -> String { "data".into() }
fn default_static_dir() -> String { "static".into() }
fn default_true() -> bool { true }
fn default_geocoder_url() -> String { "https://nominatim.openstreetmap.org".into() }
fn default_user_agent() -> String { "sos_jampa_waste_app".into() }
fn default_region_suffix() -> String { "João Pessoa, PB, Brasil".into() }
fn default_geocoder_timeout() -> u64 { 10 }
fn default_max_profile_mb() -> u32 { 2 }
fn default_max_image_mb() -> u32 { 5 }
fn default_max_image_dim() -> u32 { 1600 }

pub const USERS_FILE: &str = "users.json";
pub const POSTS_FILE: &str = "posts.json";
pub const COMMENTS_FILE: &str = "comments.json";
pub const TAGS_FILE: &str = "tags.json";
pub const COLLECTION_POINTS_FILE: &str = "collection_points.json";
pub const BANNED_FILE: &str = "banned.csv";

impl StorageConfig {
    /// Storage rooted at `dir`, with uploads under `dir/static`. Handy for tests.
    pub fn rooted_at<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            data_dir: dir.join("data").to_string_lossy().into_owned(),
            static_dir: dir.join("static").to_string_lossy().into_owned(),
        }
    }

    pub fn data_path(&self, file: &str) -> PathBuf {
        Path::new(&self.data_dir).join(file)
    }

    pub fn users_path(&self) -> PathBuf { self.data_path(USERS_FILE) }
    pub fn posts_path(&self) -> PathBuf { self.data_path(POSTS_FILE) }
    pub fn comments_path(&self) -> PathBuf { self.data_path(COMMENTS_FILE) }
    pub fn tags_path(&self) -> PathBuf { self.data_path(TAGS_FILE) }
    pub fn collection_points_path(&self) -> PathBuf { self.data_path(COLLECTION_POINTS_FILE) }
    pub fn banned_path(&self) -> PathBuf { self.data_path(BANNED_FILE) }

    pub fn upload_dir(&self) -> PathBuf {
        Path::new(&self.static_dir).join("uploads")
    }

    pub fn normalize_from_env(&mut self) {
        // SOS_DATA_DIR applies only when the TOML leaves data_dir unset
        if self.data_dir.trim().is_empty() {
            self.data_dir = std::env::var("SOS_DATA_DIR").unwrap_or_else(|_| default_data_dir());
        }
        if self.static_dir.trim().is_empty() {
            self.static_dir = default_static_dir();
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); a missing file falls back to defaults.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.runtime.normalize();
        self.storage.normalize_from_env();
        self.geocoder.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl RuntimeConfig {
    fn normalize(&mut self) {
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(2),
            Some(_) => {}
        }
    }
}

impl GeocoderConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("geocoder.base_url must start with http:// or https://"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("geocoder.user_agent must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("geocoder.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl LimitsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_profile_mb == 0 || self.max_image_mb == 0 || self.max_image_dim == 0 {
            return Err(anyhow!("limits must all be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg = load_from_str("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.runtime.worker_threads, Some(2));
        assert_eq!(cfg.limits.max_image_dim, 1600);
        assert!(cfg.geocoder.enabled);
        assert!(!cfg.storage.data_dir.is_empty());
        assert!(cfg.storage.banned_path().ends_with("banned.csv"));
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = load_from_str(
            r#"
            [runtime]
            worker_threads = 0
            log_format = "json"

            [storage]
            data_dir = "/srv/sos/data"
            static_dir = "/srv/sos/static"

            [geocoder]
            enabled = false
            base_url = "not-a-url"
            "#,
        )
        .unwrap();
        let mut cfg = cfg;
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.runtime.worker_threads, Some(2));
        assert_eq!(cfg.runtime.log_format, "json");
        assert_eq!(cfg.storage.posts_path(), PathBuf::from("/srv/sos/data/posts.json"));
        assert_eq!(cfg.storage.upload_dir(), PathBuf::from("/srv/sos/static/uploads"));
    }

    #[test]
    fn invalid_geocoder_url_is_rejected() {
        let mut cfg = load_from_str("[geocoder]\nbase_url = \"ftp://x\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut cfg = load_from_str("[limits]\nmax_image_mb = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rooted_storage_layout() {
        let root = std::env::temp_dir().join(format!("sos_cfg_{}", uuid::Uuid::new_v4()));
        let s = StorageConfig::rooted_at(&root);
        assert_eq!(s.users_path(), root.join("data").join("users.json"));
        assert_eq!(s.upload_dir(), root.join("static").join("uploads"));
    }
}
