use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    AppEnv,
    FfmpegTimeout,
    FfmpegBinary,
    FfmpegThreads,
    TempDir,
    MinFreeDiskMb,
    MaxUploadMb,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::AppEnv => "APP_ENV",
            EnvKey::FfmpegTimeout => "FFMPEG_TIMEOUT",
            EnvKey::FfmpegBinary => "FFMPEG_BIN",
            EnvKey::FfmpegThreads => "FFMPEG_THREADS",
            EnvKey::TempDir => "FFMPEG_API_TEMP_DIR",
            EnvKey::MinFreeDiskMb => "MIN_FREE_DISK_MB",
            EnvKey::MaxUploadMb => "MAX_UPLOAD_MB",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
