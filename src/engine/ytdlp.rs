//! yt-dlp backed engine

use super::{FetchRequest, MediaEngine, MediaKind, MediaMetadata};
use crate::error::EngineError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const AUDIO_FORMAT: &str = "bestaudio/best";
const SUBTITLE_LANGS: &str = "zh-Hans,zh-Hant,en";

/// Settings passed through to yt-dlp on every call
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// yt-dlp executable
    pub program: PathBuf,
    /// Netscape cookie file for authenticated downloads
    pub cookies: Option<PathBuf>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Download rate limit in yt-dlp syntax (e.g. `5M`)
    pub rate_limit: Option<String>,
    /// yt-dlp's own HTTP and fragment retries
    pub network_retries: u32,
    /// Socket timeout
    pub socket_timeout: Duration,
    /// Extra arguments placed before the generated ones
    pub extra_args: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            cookies: None,
            proxy: None,
            rate_limit: Some("5M".to_string()),
            network_retries: 3,
            socket_timeout: Duration::from_secs(30),
            extra_args: Vec::new(),
        }
    }
}

/// Engine that shells out to yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    options: EngineOptions,
}

impl YtDlpEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Resolve a program name against `PATH`
    pub fn locate(program: &str) -> Result<PathBuf, EngineError> {
        which::which(program).map_err(|_| EngineError::NotFound(program.to_string()))
    }

    /// Full argument list for one request
    pub fn build_args(&self, request: &FetchRequest) -> Vec<String> {
        let mut args: Vec<String> = self.options.extra_args.clone();

        args.extend(
            [
                "--no-warnings",
                "--no-color",
                "--no-check-certificate",
                "--no-progress",
                "--continue",
                "--dump-json",
                "--no-simulate",
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        for (name, value) in request.headers.iter() {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }

        let retries = self.options.network_retries.to_string();
        args.extend([
            "--socket-timeout".to_string(),
            self.options.socket_timeout.as_secs().to_string(),
            "--retries".to_string(),
            retries.clone(),
            "--fragment-retries".to_string(),
            retries,
            "--sleep-interval".to_string(),
            "1".to_string(),
            "--max-sleep-interval".to_string(),
            "3".to_string(),
            "--sleep-requests".to_string(),
            "1".to_string(),
        ]);

        if let Some(rate_limit) = &self.options.rate_limit {
            args.push("--limit-rate".to_string());
            args.push(rate_limit.clone());
        }

        if let Some(cookies) = &self.options.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.display().to_string());
        }

        if let Some(proxy) = &self.options.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        match request.kind {
            MediaKind::Video => {
                args.extend(
                    [
                        "-f",
                        VIDEO_FORMAT,
                        "--merge-output-format",
                        "mp4",
                        "--write-subs",
                        "--write-auto-subs",
                        "--sub-langs",
                        SUBTITLE_LANGS,
                        "--embed-subs",
                        "--recode-video",
                        "mp4",
                    ]
                    .iter()
                    .map(|s| s.to_string()),
                );
            }
            MediaKind::Audio => {
                args.extend(
                    [
                        "-f",
                        AUDIO_FORMAT,
                        "--extract-audio",
                        "--audio-format",
                        "mp3",
                        "--audio-quality",
                        "320K",
                    ]
                    .iter()
                    .map(|s| s.to_string()),
                );
            }
        }

        args.push("-o".to_string());
        args.push(output_template(&request.output_stem));
        // Keep URLs starting with '-' from being read as options
        args.push("--".to_string());
        args.push(request.url.clone());

        args
    }
}

/// `-o` template for a stem; literal `%` is doubled so yt-dlp does not expand it
fn output_template(stem: &Path) -> String {
    format!("{}.%(ext)s", stem.display().to_string().replace('%', "%%"))
}

/// Most useful line of engine stderr: the last `ERROR:` line, else the last line
fn failure_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|line| line.to_string())
        .unwrap_or_default()
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn fetch(&self, request: &FetchRequest) -> Result<MediaMetadata, EngineError> {
        let program = self.options.program.display().to_string();
        let args = self.build_args(request);
        debug!("Running {} {:?}", program, args);

        let output = Command::new(&self.options.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                program,
                status: output.status.to_string(),
                message: failure_message(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(MediaMetadata::from_engine_output(&stdout).unwrap_or_else(|| {
            debug!("{} produced no metadata for {}", program, request.url);
            MediaMetadata::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::HeaderSet;

    fn request(kind: MediaKind) -> FetchRequest {
        let mut headers = HeaderSet::new();
        headers.insert("User-Agent", "agent/1.0");
        headers.insert("Accept-Language", "en");
        FetchRequest {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            kind,
            output_stem: PathBuf::from("downloads/videos/lesson_1"),
            headers,
        }
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|pair| pair[0] == flag && pair[1] == value)
    }

    /// Engine whose program is `sh -c <script>`; generated args land in `$1..`
    #[cfg(unix)]
    fn shell_engine(script: &str) -> YtDlpEngine {
        YtDlpEngine::new(EngineOptions {
            program: PathBuf::from("sh"),
            extra_args: vec![
                "-c".to_string(),
                script.to_string(),
                "fake-engine".to_string(),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn test_video_args() {
        let engine = YtDlpEngine::new(EngineOptions::default());
        let args = engine.build_args(&request(MediaKind::Video));

        assert!(has_pair(&args, "-f", VIDEO_FORMAT));
        assert!(has_pair(&args, "--merge-output-format", "mp4"));
        assert!(has_pair(&args, "--sub-langs", SUBTITLE_LANGS));
        assert!(args.contains(&"--embed-subs".to_string()));
        assert!(has_pair(&args, "--limit-rate", "5M"));
        assert!(has_pair(&args, "--retries", "3"));
        assert!(has_pair(&args, "--socket-timeout", "30"));
        assert!(has_pair(&args, "--add-header", "User-Agent:agent/1.0"));
        assert!(has_pair(&args, "--add-header", "Accept-Language:en"));
        assert!(has_pair(&args, "-o", "downloads/videos/lesson_1.%(ext)s"));
        assert!(!args.contains(&"--extract-audio".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert!(!args.contains(&"--proxy".to_string()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_audio_args_with_cookies_and_proxy() {
        let engine = YtDlpEngine::new(EngineOptions {
            cookies: Some(PathBuf::from("cookies.txt")),
            proxy: Some("socks5://127.0.0.1:1080".to_string()),
            rate_limit: None,
            ..Default::default()
        });
        let args = engine.build_args(&request(MediaKind::Audio));

        assert!(has_pair(&args, "-f", AUDIO_FORMAT));
        assert!(has_pair(&args, "--audio-format", "mp3"));
        assert!(has_pair(&args, "--audio-quality", "320K"));
        assert!(has_pair(&args, "--cookies", "cookies.txt"));
        assert!(has_pair(&args, "--proxy", "socks5://127.0.0.1:1080"));
        assert!(!args.contains(&"--limit-rate".to_string()));
        assert!(!args.contains(&"--embed-subs".to_string()));
    }

    #[test]
    fn test_extra_args_come_first() {
        let engine = YtDlpEngine::new(EngineOptions {
            extra_args: vec!["--ignore-config".to_string()],
            ..Default::default()
        });
        let args = engine.build_args(&request(MediaKind::Video));
        assert_eq!(args[0], "--ignore-config");
    }

    #[test]
    fn test_output_template_escapes_percent() {
        let mut req = request(MediaKind::Audio);
        req.output_stem = PathBuf::from("downloads/audio/100% %(title)s");
        let args = YtDlpEngine::new(EngineOptions::default()).build_args(&req);
        assert!(has_pair(
            &args,
            "-o",
            "downloads/audio/100%% %%(title)s.%(ext)s"
        ));
    }

    #[test]
    fn test_failure_message() {
        let stderr = "WARNING: something\nERROR: [youtube] abc: Video unavailable\n\ntrailing note\n";
        assert_eq!(failure_message(stderr), "ERROR: [youtube] abc: Video unavailable");
        assert_eq!(failure_message("just this\n"), "just this");
        assert_eq!(failure_message(""), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_parses_metadata() {
        let engine = shell_engine(r#"echo '{"id": "abc", "title": "Lesson", "ext": "mp4"}'"#);
        let meta = engine.fetch(&request(MediaKind::Video)).await.unwrap();
        assert_eq!(meta.id.as_deref(), Some("abc"));
        assert_eq!(meta.title.as_deref(), Some("Lesson"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_without_metadata_is_success() {
        let engine = shell_engine("exit 0");
        let meta = engine.fetch(&request(MediaKind::Audio)).await.unwrap();
        assert_eq!(meta, MediaMetadata::default());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_reports_failure() {
        let engine = shell_engine("echo 'ERROR: private video' >&2; exit 1");
        let err = engine.fetch(&request(MediaKind::Video)).await.unwrap_err();
        match err {
            EngineError::Failed { message, .. } => assert_eq!(message, "ERROR: private video"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_program() {
        let engine = YtDlpEngine::new(EngineOptions {
            program: PathBuf::from("/nonexistent/ryt-batch-engine"),
            ..Default::default()
        });
        let err = engine.fetch(&request(MediaKind::Video)).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[test]
    fn test_locate_missing_program() {
        let err = YtDlpEngine::locate("ryt-batch-no-such-binary").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
