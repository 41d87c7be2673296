use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const SERVICE_NAME: &str = "ffmpeg-api";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Development,
    #[default]
    Production,
}

impl AppMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => AppMode::Development,
            _ => AppMode::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Development => "development",
            AppMode::Production => "production",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub mode: AppMode,
    /// Deadline for one ffmpeg run. `None` lets it run to completion.
    pub ffmpeg_timeout: Option<Duration>,
    pub ffmpeg_binary: String,
    pub ffmpeg_threads: u32,
    pub temp_dir: PathBuf,
    /// Requests are refused with 503 below this much free space. Zero only logs.
    pub min_free_disk_bytes: u64,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Self {
        let timeout_secs = env::get_parsed(EnvKey::FfmpegTimeout, 0u64);
        let temp_dir = env::get(EnvKey::TempDir)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_temp_dir());

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 8000),
            mode: AppMode::parse(&env::get_or(EnvKey::AppEnv, "production")),
            ffmpeg_timeout: timeout_from_secs(timeout_secs),
            ffmpeg_binary: env::get_or(EnvKey::FfmpegBinary, "ffmpeg"),
            ffmpeg_threads: env::get_parsed(EnvKey::FfmpegThreads, 0),
            temp_dir,
            min_free_disk_bytes: mib_to_bytes(env::get_parsed(EnvKey::MinFreeDiskMb, 0u64)),
            max_upload_bytes: usize::try_from(mib_to_bytes(env::get_parsed(
                EnvKey::MaxUploadMb,
                2048u64,
            )))
            .unwrap_or(usize::MAX),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8000,
            mode: AppMode::Production,
            ffmpeg_timeout: None,
            ffmpeg_binary: "ffmpeg".to_string(),
            ffmpeg_threads: 0,
            temp_dir: default_temp_dir(),
            min_free_disk_bytes: 0,
            max_upload_bytes: 2048 * 1024 * 1024,
        }
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("ffmpeg_api")
}

/// Saturates instead of wrapping, so a huge minimum can never turn into 0.
fn mib_to_bytes(mib: u64) -> u64 {
    mib.saturating_mul(1024 * 1024)
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_unbounded() {
        assert_eq!(timeout_from_secs(0), None);
        assert_eq!(timeout_from_secs(30), Some(Duration::from_secs(30)));
    }

    #[test]
    fn huge_sizes_saturate() {
        assert_eq!(mib_to_bytes(0), 0);
        assert_eq!(mib_to_bytes(2), 2 * 1024 * 1024);
        assert_eq!(mib_to_bytes(u64::MAX), u64::MAX);
        assert_eq!(mib_to_bytes(u64::MAX / 1024), u64::MAX);
    }

    #[test]
    fn mode_parsing_defaults_to_production() {
        assert_eq!(AppMode::parse("development"), AppMode::Development);
        assert_eq!(AppMode::parse(" DEV "), AppMode::Development);
        assert_eq!(AppMode::parse("staging"), AppMode::Production);
        assert_eq!(AppMode::Development.as_str(), "development");
    }
}
