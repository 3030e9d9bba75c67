use crate::domain::jobs::Invocation;
use crate::ports::downloader::{DownloadOutcome, Downloader};
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Runs the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn download(&self, invocation: &Invocation) -> io::Result<DownloadOutcome> {
        tracing::debug!(program = %self.program.display(), args = ?invocation.args(), "Spawning downloader");

        let output = TokioCommand::new(&self.program)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(DownloadOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::application::job_runner::{JobRunner, RunnerSettings};
    use crate::domain::error::JobError;
    use crate::domain::jobs::{DownloadRequest, Quality};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn invocation(work_dir: &Path, quality: Quality) -> Invocation {
        let request = DownloadRequest {
            source_url: "https://www.youtube.com/watch?v=abc".to_string(),
            quality,
        };
        Invocation::new(&request, work_dir)
    }

    #[tokio::test]
    async fn test_writes_into_template_directory() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        // $3 is the output template; write next to it.
        let program = script(
            bin.path(),
            "fake-ytdlp",
            r#"printf 'video' > "$(dirname "$3")/Title.mp4""#,
        );

        let outcome = YtDlp::new(program)
            .download(&invocation(work.path(), Quality::Best))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(
            std::fs::read(work.path().join("Title.mp4")).unwrap(),
            b"video"
        );
    }

    #[tokio::test]
    async fn test_passes_expected_arguments() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let program = script(
            bin.path(),
            "echo-args",
            r#"dir="$(dirname "$3")"; printf '%s\n' "$@" > "$dir/args.txt""#,
        );

        YtDlp::new(program)
            .download(&invocation(work.path(), Quality::parse(Some("720"))))
            .await
            .unwrap();

        let recorded = std::fs::read_to_string(work.path().join("args.txt")).unwrap();
        let lines: Vec<&str> = recorded.lines().collect();
        assert_eq!(lines[0], "https://www.youtube.com/watch?v=abc");
        assert_eq!(lines[1], "-o");
        assert!(lines[2].ends_with("/%(title)s.%(ext)s"));
        assert_eq!(&lines[3..5], &["--no-warnings", "--quiet"]);
        assert_eq!(&lines[5..], &["-f", "bestvideo[height<=720]+bestaudio/best"]);
    }

    #[tokio::test]
    async fn test_failure_captures_stderr() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let program = script(
            bin.path(),
            "failing",
            "echo 'ERROR: Unsupported URL' >&2\nexit 3",
        );

        let outcome = YtDlp::new(program)
            .download(&invocation(work.path(), Quality::Best))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stderr.trim(), "ERROR: Unsupported URL");
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let work = tempdir().unwrap();
        let result = YtDlp::new(work.path().join("does-not-exist"))
            .download(&invocation(work.path(), Quality::Best))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_kills_the_process() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let marker = bin.path().join("finished");
        let program = script(
            bin.path(),
            "slow",
            &format!("sleep 1\ntouch '{}'", marker.display()),
        );
        let settings = RunnerSettings {
            work_dir: work.path().to_path_buf(),
            job_dir_prefix: "yt-".to_string(),
            max_size_mb: 1024,
            timeout: Duration::from_millis(200),
            platform_marker: "youtube".to_string(),
            max_concurrent: 1,
        };
        let runner = JobRunner::new(YtDlp::new(program), settings).unwrap();

        let err = runner
            .run_download_job("https://www.youtube.com/watch?v=slow", Quality::Best)
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "downloader kept running after the timeout");
    }
}
