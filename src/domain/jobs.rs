use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a single download job. Its string form names the job's
/// working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Requested quality tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quality {
    Best,
    /// Upper bound on video height, forwarded verbatim to the downloader.
    MaxHeight(String),
}

impl Quality {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("best") => Quality::Best,
            Some(height) => Quality::MaxHeight(height.to_string()),
        }
    }

    /// Format selector passed with `-f`, if any.
    pub fn format_selector(&self) -> Option<String> {
        match self {
            Quality::Best => None,
            Quality::MaxHeight(h) => Some(format!("bestvideo[height<={}]+bestaudio/best", h)),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Best => f.write_str("best"),
            Quality::MaxHeight(h) => f.write_str(h),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub quality: Quality,
}

/// One call of the external downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub source_url: String,
    pub work_dir: PathBuf,
    pub format: Option<String>,
}

impl Invocation {
    pub fn new(request: &DownloadRequest, work_dir: &Path) -> Self {
        Self {
            source_url: request.source_url.clone(),
            work_dir: work_dir.to_path_buf(),
            format: request.quality.format_selector(),
        }
    }

    /// `<work_dir>/<title>.<ext>` in the downloader's template syntax.
    pub fn output_template(&self) -> PathBuf {
        self.work_dir.join("%(title)s.%(ext)s")
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.source_url.clone().into(),
            "-o".into(),
            self.output_template().into_os_string(),
            "--no-warnings".into(),
            "--quiet".into(),
        ];
        if let Some(ref format) = self.format {
            args.push("-f".into());
            args.push(format.clone().into());
        }
        args
    }
}

/// Metadata of a finished job's file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: JobId,
    pub status: String,
    pub filename: String,
    pub file_path: PathBuf,
    pub file_size_mb: f64,
}

impl JobResult {
    pub fn new(job_id: JobId, filename: String, file_path: PathBuf, size_bytes: u64) -> Self {
        Self {
            job_id,
            status: "success".to_string(),
            filename,
            file_path,
            file_size_mb: round2(bytes_to_mb(size_bytes)),
        }
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
