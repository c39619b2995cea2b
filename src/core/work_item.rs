//! Work list parsing

use crate::utils::is_http_url;
use std::fmt;
use tracing::warn;

/// One entry of the work list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Name used for output files (before sanitizing)
    pub display_name: String,
    /// Page URL handed to the engine
    pub source_url: String,
    /// 1-based line number in the list file
    pub line: usize,
}

impl WorkItem {
    pub fn new(display_name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            source_url: source_url.into(),
            line: 0,
        }
    }

    /// `name url`, the format of both the work list and the failure report
    pub fn to_line(&self) -> String {
        format!("{} {}", self.display_name, self.source_url)
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// A line that was ignored because it is not `name url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub content: String,
}

/// Result of parsing a work list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedList {
    pub items: Vec<WorkItem>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse one line; `None` for blank and comment lines, `Some(Err)` for malformed ones
fn parse_line(line: &str) -> Option<Result<(String, String), ()>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let url = parts.next().map(str::trim).unwrap_or_default();

    if name.is_empty() || url.is_empty() {
        return Some(Err(()));
    }

    Some(Ok((name.to_string(), url.to_string())))
}

/// Parse the text of a work list.
///
/// Blank lines and `#` comments are ignored. The first whitespace-delimited
/// token is the name and the rest of the line is the URL; lines without a
/// URL are skipped with a warning.
pub fn parse_work_list(text: &str) -> ParsedList {
    let mut parsed = ParsedList::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        match parse_line(raw) {
            None => {}
            Some(Ok((display_name, source_url))) => {
                if !is_http_url(&source_url) {
                    warn!("Line {}: {:?} is not an http(s) URL, trying anyway", line, source_url);
                }
                parsed.items.push(WorkItem {
                    display_name,
                    source_url,
                    line,
                });
            }
            Some(Err(())) => {
                warn!("Line {} is malformed, skipping: {}", line, raw.trim());
                parsed.skipped.push(SkippedLine {
                    line,
                    content: raw.trim().to_string(),
                });
            }
        }
    }

    parsed
}

/// Commented sample list written when the work list is missing
pub fn sample_work_list() -> &'static str {
    "# ryt-batch work list\n\
     # Format: <name> <url>, one item per line\n\
     # Lines starting with # are ignored\n\
     # The name must not contain spaces; use underscores instead\n\
     \n\
     # Examples:\n\
     Python_Tutorial_Part_1 https://www.youtube.com/watch?v=dQw4w9WgXcQ\n\
     Python_Tutorial_Part_2 https://www.youtube.com/watch?v=example123\n\
     # Members-only example (needs cookies.txt):\n\
     # Members_Only_Content https://www.youtube.com/watch?v=member_only\n"
}
