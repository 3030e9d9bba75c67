//! Configuration loaded from the environment (and `.env` when present).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Root under which per-job working directories are created
    pub work_dir: PathBuf,
    /// Working directory name prefix, followed by the job id
    pub job_dir_prefix: String,
    /// Largest accepted download, in gigabytes
    pub max_video_size_gb: u64,
    /// Wall-clock bound on one downloader run
    pub download_timeout: Duration,
    /// Downloader executable
    pub ytdlp_bin: PathBuf,
    /// Substring a source URL must contain (case-insensitive)
    pub platform_marker: String,
    /// Downloader processes allowed to run at once
    pub max_concurrent_downloads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: String::from("0.0.0.0"),
            port: 8080,
            work_dir: env::temp_dir(),
            job_dir_prefix: String::from("yt-"),
            max_video_size_gb: 5,
            download_timeout: Duration::from_secs(3600),
            ytdlp_bin: PathBuf::from("yt-dlp"),
            platform_marker: String::from("youtube"),
            max_concurrent_downloads: 4,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup; unset keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            addr: lookup("ADDR").unwrap_or(defaults.addr),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            work_dir: lookup("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            job_dir_prefix: lookup("JOB_DIR_PREFIX").unwrap_or(defaults.job_dir_prefix),
            max_video_size_gb: parse_or(&lookup, "MAX_VIDEO_SIZE_GB", defaults.max_video_size_gb)?,
            download_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DOWNLOAD_TIMEOUT_SECS",
                defaults.download_timeout.as_secs(),
            )?),
            ytdlp_bin: lookup("YTDLP_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.ytdlp_bin),
            platform_marker: lookup("PLATFORM_MARKER").unwrap_or(defaults.platform_marker),
            max_concurrent_downloads: match parse_or(
                &lookup,
                "MAX_CONCURRENT_DOWNLOADS",
                defaults.max_concurrent_downloads,
            )? {
                0 => {
                    return Err(ConfigError::Invalid {
                        key: "MAX_CONCURRENT_DOWNLOADS",
                        value: "0".to_string(),
                    })
                }
                n => n,
            },
        })
    }

    pub fn max_size_mb(&self) -> u64 {
        self.max_video_size_gb * 1024
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
