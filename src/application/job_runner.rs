use crate::config::{ConfigError, ServiceConfig};
use crate::domain::error::JobError;
use crate::domain::jobs::{bytes_to_mb, DownloadRequest, Invocation, JobId, JobResult, Quality};
use crate::ports::downloader::Downloader;
use regex::{Regex, RegexBuilder};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Limits and locations a [`JobRunner`] works with.
#[derive(Clone, Debug)]
pub struct RunnerSettings {
    pub work_dir: PathBuf,
    pub job_dir_prefix: String,
    pub max_size_mb: u64,
    pub timeout: Duration,
    pub platform_marker: String,
    pub max_concurrent: usize,
}

impl From<&ServiceConfig> for RunnerSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            job_dir_prefix: config.job_dir_prefix.clone(),
            max_size_mb: config.max_size_mb(),
            timeout: config.download_timeout,
            platform_marker: config.platform_marker.clone(),
            max_concurrent: config.max_concurrent_downloads,
        }
    }
}

/// A regular file found in a job's working directory.
#[derive(Debug)]
struct FoundFile {
    name: String,
    path: PathBuf,
    size_bytes: u64,
}

/// Runs one downloader invocation per job inside its own working directory
/// and reports on the file it leaves behind.
pub struct JobRunner<D> {
    downloader: D,
    settings: RunnerSettings,
    platform: Regex,
    permits: Semaphore,
}

impl<D> JobRunner<D>
where
    D: Downloader,
{
    pub fn new(downloader: D, settings: RunnerSettings) -> Result<Self, ConfigError> {
        let platform = RegexBuilder::new(&regex::escape(&settings.platform_marker))
            .case_insensitive(true)
            .build()
            .map_err(|_| ConfigError::Invalid {
                key: "PLATFORM_MARKER",
                value: settings.platform_marker.clone(),
            })?;
        let permits = Semaphore::new(settings.max_concurrent.max(1));

        Ok(Self {
            downloader,
            settings,
            platform,
            permits,
        })
    }

    fn exceeds_limit(&self, size_mb: f64) -> bool {
        size_mb > self.settings.max_size_mb as f64
    }

    /// Working directory of `job_id`. The mapping is one-to-one.
    pub fn work_dir_for(&self, job_id: &JobId) -> PathBuf {
        self.settings
            .work_dir
            .join(format!("{}{}", self.settings.job_dir_prefix, job_id))
    }

    /// Checks the URL before any job is allocated.
    pub fn validate(&self, source_url: &str, quality: Quality) -> Result<DownloadRequest, JobError> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(JobError::Validation(
                "missing parameter: video_url".to_string(),
            ));
        }
        // Would be read as a downloader option.
        if source_url.starts_with('-') {
            return Err(JobError::Validation(
                "video_url must not start with '-'".to_string(),
            ));
        }
        if !self.platform.is_match(source_url) {
            return Err(JobError::Validation(format!(
                "URL must be a {} URL",
                self.settings.platform_marker
            )));
        }

        Ok(DownloadRequest {
            source_url: source_url.to_string(),
            quality,
        })
    }

    pub async fn run_download_job(
        &self,
        source_url: &str,
        quality: Quality,
    ) -> Result<JobResult, JobError> {
        let request = self.validate(source_url, quality)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| JobError::Unexpected {
                job_id: None,
                message: e.to_string(),
            })?;

        let job_id = JobId::new();
        let work_dir = self.work_dir_for(&job_id);

        tracing::info!(
            job_id = %job_id,
            url = %request.source_url,
            quality = %request.quality,
            work_dir = %work_dir.display(),
            "Starting download"
        );

        tokio::fs::create_dir_all(&work_dir)
            .await
            .map_err(|source| JobError::Directory { job_id, source })?;

        let invocation = Invocation::new(&request, &work_dir);
        let outcome =
            match tokio::time::timeout(self.settings.timeout, self.downloader.download(&invocation))
                .await
            {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    tracing::error!(job_id = %job_id, error = %e, "Downloader could not be run");
                    return Err(JobError::Unexpected {
                        job_id: Some(job_id),
                        message: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        job_id = %job_id,
                        limit_secs = self.settings.timeout.as_secs(),
                        "Download timed out"
                    );
                    return Err(JobError::Timeout {
                        job_id,
                        limit_secs: self.settings.timeout.as_secs(),
                    });
                }
            };

        if !outcome.success {
            let stderr = match outcome.stderr.trim() {
                "" => "unknown error".to_string(),
                text => text.to_string(),
            };
            tracing::warn!(
                job_id = %job_id,
                exit_code = ?outcome.exit_code,
                error = %stderr,
                "Downloader failed"
            );
            return Err(JobError::Execution { job_id, stderr });
        }

        let file = match first_file(&work_dir).await.map_err(|e| JobError::Unexpected {
            job_id: Some(job_id),
            message: e.to_string(),
        })? {
            Some(file) => file,
            None => {
                tracing::warn!(job_id = %job_id, "Downloader produced no file");
                return Err(JobError::EmptyResult { job_id });
            }
        };

        let size_mb = bytes_to_mb(file.size_bytes);
        if self.exceeds_limit(size_mb) {
            if let Err(e) = tokio::fs::remove_file(&file.path).await {
                tracing::error!(job_id = %job_id, error = %e, "Could not remove oversized file");
                return Err(JobError::Unexpected {
                    job_id: Some(job_id),
                    message: format!("could not remove oversized file: {}", e),
                });
            }
            tracing::warn!(
                job_id = %job_id,
                size_mb,
                limit_mb = self.settings.max_size_mb,
                "Downloaded file exceeds size limit"
            );
            return Err(JobError::TooLarge {
                job_id,
                size_mb,
                limit_mb: self.settings.max_size_mb,
            });
        }

        let result = JobResult::new(job_id, file.name, file.path, file.size_bytes);
        tracing::info!(
            job_id = %job_id,
            filename = %result.filename,
            size_mb = result.file_size_mb,
            "Download complete"
        );
        Ok(result)
    }

    /// Reads back the file of an earlier job. Never spawns the downloader.
    pub async fn lookup_job_file(&self, job_id: &str) -> Result<JobResult, JobError> {
        let not_found = || JobError::NotFound("job id not found".to_string());

        let job_id: JobId = job_id.parse().map_err(|_| not_found())?;
        let work_dir = self.work_dir_for(&job_id);

        match tokio::fs::metadata(&work_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(JobError::Unexpected {
                    job_id: Some(job_id),
                    message: e.to_string(),
                })
            }
        }

        match first_file(&work_dir).await {
            Ok(Some(file)) if self.exceeds_limit(bytes_to_mb(file.size_bytes)) => {
                Err(JobError::TooLarge {
                    job_id,
                    size_mb: bytes_to_mb(file.size_bytes),
                    limit_mb: self.settings.max_size_mb,
                })
            }
            Ok(Some(file)) => Ok(JobResult::new(job_id, file.name, file.path, file.size_bytes)),
            Ok(None) => Err(JobError::NotFound("no files for this job".to_string())),
            Err(e) => Err(JobError::Unexpected {
                job_id: Some(job_id),
                message: e.to_string(),
            }),
        }
    }
}

/// First regular file of `dir` by name.
async fn first_file(dir: &Path) -> io::Result<Option<FoundFile>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        if meta.is_file() {
            files.push(FoundFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                size_bytes: meta.len(),
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files.into_iter().next())
}
