use crate::domain::jobs::JobId;

/// Failure of a download job or of a lookup.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(String),

    #[error("could not create working directory: {source}")]
    Directory {
        job_id: JobId,
        #[source]
        source: std::io::Error,
    },

    #[error("error downloading video: {stderr}")]
    Execution { job_id: JobId, stderr: String },

    #[error("timeout: download took longer than {limit_secs}s")]
    Timeout { job_id: JobId, limit_secs: u64 },

    #[error("no file was downloaded")]
    EmptyResult { job_id: JobId },

    #[error("file too large: {size_mb:.2} MB (limit: {limit_mb} MB)")]
    TooLarge {
        job_id: JobId,
        size_mb: f64,
        limit_mb: u64,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("error: {message}")]
    Unexpected {
        job_id: Option<JobId>,
        message: String,
    },
}

impl JobError {
    /// Job id allocated before the failure, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            JobError::Directory { job_id, .. }
            | JobError::Execution { job_id, .. }
            | JobError::Timeout { job_id, .. }
            | JobError::EmptyResult { job_id }
            | JobError::TooLarge { job_id, .. } => Some(*job_id),
            JobError::Unexpected { job_id, .. } => *job_id,
            JobError::Validation(_) | JobError::NotFound(_) => None,
        }
    }
}
