//! Browser cookie file detection and the cookie export guide

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of inspecting a Netscape-format cookie file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieFile {
    /// Path to the cookie file
    pub path: PathBuf,
    /// Number of well-formed cookie records
    pub records: usize,
}

/// Count well-formed records in Netscape cookie file content.
///
/// A record is a non-comment line with seven tab-separated fields.
/// `#HttpOnly_` prefixed lines are records, not comments.
pub fn count_cookie_records(content: &str) -> usize {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#') || line.starts_with("#HttpOnly_"))
        .filter(|line| line.split('\t').count() == 7)
        .count()
}

/// Look for a cookie file; its presence switches on authenticated downloads
pub fn detect_cookie_file(path: &Path) -> io::Result<Option<CookieFile>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let records = count_cookie_records(&content);
    if records == 0 {
        warn!(
            "{} has no Netscape-format cookie records, passing it to the engine anyway",
            path.display()
        );
    }

    Ok(Some(CookieFile {
        path: path.to_path_buf(),
        records,
    }))
}

/// Write the cookie export guide unless it already exists
pub fn ensure_cookie_guide(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    fs::write(path, cookie_guide())?;
    info!("Created {}, see it for how to export cookies", path.display());
    Ok(true)
}

/// Text of the cookie export guide
pub fn cookie_guide() -> String {
    format!(
        r#"# Exporting browser cookies

Members-only or age-gated videos need an authenticated session. Export the
cookies of a logged-in browser to `cookies.txt` next to the work list and
ryt-batch will pass them to yt-dlp.

## Option 1: browser extension

Chrome / Edge: install "Get cookies.txt LOCALLY", open the site while logged
in, export, and save the file as cookies.txt.

Firefox: install "cookies.txt", open the site while logged in, choose
"Current Site" and export.

## Option 2: let yt-dlp extract them

    yt-dlp --cookies-from-browser chrome --cookies cookies.txt --skip-download <any video URL>
    yt-dlp --cookies-from-browser firefox --cookies cookies.txt --skip-download <any video URL>

The browser may need to be closed first.

## Notes

1. Cookies contain your login session. Never share the file.
2. Cookies expire; export them again when authenticated downloads start failing.
3. The file must be in Netscape format (seven tab-separated fields per line).
4. Check it with: yt-dlp --cookies cookies.txt -F <members-only video URL>

---
Generated: {}
"#,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
