//! External editor round trip.
//!
//! Titled entries are edited as a small marker template:
//!
//! ```text
//! [position]: 0
//! [title]: title
//! [attachment]: /path/to/file, URL or tag
//! [body]:
//! free text, any number of lines
//! ```
//!
//! The `[attachment]:` line only appears for format 2. Format 0 notes are
//! edited as raw text. A buffer is committed only if the editor changed its
//! modification time; saving without changes still counts.

use crate::error::{PensiveError, Result};
use crate::model::{Entry, Format};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

const POSITION: &str = "[position]:";
const TITLE: &str = "[title]:";
const ATTACHMENT: &str = "[attachment]:";
const BODY: &str = "[body]:";

static BUFFERS: AtomicUsize = AtomicUsize::new(0);

/// Editor buffer for a new titled entry, or for editing `entry`.
pub fn template(format: Format, entry: Option<&Entry>) -> String {
    if format == Format::Note {
        return entry.map(|e| e.body().to_string()).unwrap_or_default();
    }

    let (position, title, attachment, body) = match entry {
        Some(e) => (
            e.position(),
            e.title().unwrap_or_default(),
            e.attachment().unwrap_or_default(),
            e.body(),
        ),
        None => (0, "title", "/path/to/file, URL or tag", ""),
    };

    let mut buf = format!("{} {}\n{} {}\n", POSITION, position, TITLE, title);
    if format == Format::Attached {
        buf.push_str(&format!("{} {}\n", ATTACHMENT, attachment));
    }
    buf.push_str(BODY);
    buf.push('\n');
    if !body.is_empty() {
        buf.push_str(body);
        buf.push('\n');
    }
    buf
}

/// Reads an edited buffer back into an entry filed under `tag`.
///
/// Marker lines set their field; every other line goes to the body. Text
/// after `[body]:` on the marker line itself becomes the first body line.
pub fn parse_buffer(format: Format, tag: &str, buffer: &str) -> Result<Entry> {
    if format == Format::Note {
        return Ok(Entry::note(tag, buffer.trim_end_matches(['\n', '\r'])));
    }

    let mut position = None;
    let mut title = None;
    let mut attachment = None;
    let mut body: Vec<&str> = Vec::new();

    for line in buffer.lines() {
        if let Some(rest) = line.strip_prefix(POSITION) {
            let value = rest.trim();
            position = Some(value.parse::<i64>().map_err(|_| {
                PensiveError::InvalidBuffer(format!("position '{}' is not a number", value))
            })?);
        } else if let Some(rest) = line.strip_prefix(TITLE) {
            title = Some(field(rest));
        } else if let Some(rest) = line.strip_prefix(ATTACHMENT) {
            attachment = Some(field(rest));
        } else if let Some(rest) = line.strip_prefix(BODY) {
            let rest = field(rest);
            if !rest.is_empty() {
                body.push(rest);
            }
        } else {
            body.push(line);
        }
    }

    while body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }
    let body = body.join("\n");
    let position = position.unwrap_or(0);
    let title = match title {
        Some(t) if !t.is_empty() => t,
        _ => return Err(PensiveError::InvalidBuffer("missing title".to_string())),
    };

    match format {
        Format::Titled => Ok(Entry::titled(tag, position, title, body)),
        _ => {
            let attachment = match attachment {
                Some(a) if !a.is_empty() => a,
                _ => {
                    return Err(PensiveError::InvalidBuffer(
                        "missing attachment".to_string(),
                    ))
                }
            };
            Ok(Entry::attached(tag, position, title, body, attachment))
        }
    }
}

/// Marker values drop the single space after the colon, nothing else.
fn field(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}

/// Writes `initial` to a scratch file, opens it in `editor` and waits.
///
/// Returns the new buffer if the file's modification time changed, `None`
/// if the editor left it untouched.
pub fn edit(editor: &str, initial: &str) -> Result<Option<String>> {
    let n = BUFFERS.fetch_add(1, Ordering::Relaxed);
    let path = env::temp_dir().join(format!("pensive-{}-{}.txt", std::process::id(), n));
    fs::write(&path, initial)?;
    let result = edit_file(editor, &path);
    let _ = fs::remove_file(&path);
    result
}

fn edit_file(editor: &str, path: &Path) -> Result<Option<String>> {
    // Pin the mtime to a fixed point in the past so any later write differs.
    fs::File::options()
        .write(true)
        .open(path)?
        .set_modified(UNIX_EPOCH + Duration::from_secs(1))?;
    let before = modified(path)?;

    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PensiveError::Api("No editor configured".to_string()))?;
    debug!(editor, path = %path.display(), "launching editor");

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| PensiveError::Api(format!("Failed to launch editor '{}': {}", editor, e)))?;
    if !status.success() {
        return Err(PensiveError::Api(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    if modified(path)? == before {
        debug!("buffer untouched");
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?))
}

fn modified(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_titled_template() {
        assert_eq!(
            template(Format::Titled, None),
            "[position]: 0\n[title]: title\n[body]:\n"
        );
        assert!(template(Format::Attached, None).contains("[attachment]: /path/to/file"));
    }

    #[test]
    fn existing_entry_template_parses_back() {
        let entry = Entry::attached("rust", 3, "The Book", "read\nit", "https://doc.rust-lang.org");
        let buf = template(Format::Attached, Some(&entry));
        assert_eq!(parse_buffer(Format::Attached, "rust", &buf).unwrap(), entry);
    }

    #[test]
    fn note_is_raw_text() {
        let entry = Entry::note("git", "git log\ngit status");
        assert_eq!(template(Format::Note, Some(&entry)), "git log\ngit status");
        assert_eq!(
            parse_buffer(Format::Note, "git", "git log\ngit status\n").unwrap(),
            entry
        );
    }

    #[test]
    fn non_marker_lines_join_into_body() {
        let buf = "intro\n[title]: T\n[position]: 7\n[body]: first\nsecond\n\n";
        let parsed = parse_buffer(Format::Titled, "t", buf).unwrap();
        assert_eq!(parsed, Entry::titled("t", 7, "T", "intro\nfirst\nsecond"));
    }

    #[test]
    fn title_keeps_inner_spacing() {
        let buf = "[title]:  padded  \n[body]:\n";
        let parsed = parse_buffer(Format::Titled, "t", buf).unwrap();
        assert_eq!(parsed.title(), Some(" padded  "));
    }

    #[test]
    fn invalid_buffers() {
        assert!(matches!(
            parse_buffer(Format::Titled, "t", "[position]: x\n[title]: a\n"),
            Err(PensiveError::InvalidBuffer(_))
        ));
        assert!(matches!(
            parse_buffer(Format::Titled, "t", "[position]: 1\n"),
            Err(PensiveError::InvalidBuffer(_))
        ));
        assert!(matches!(
            parse_buffer(Format::Attached, "t", "[title]: a\n"),
            Err(PensiveError::InvalidBuffer(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn untouched_buffer_commits_nothing() {
        assert_eq!(edit("true", "keep").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn touched_buffer_commits_even_if_identical() {
        assert_eq!(edit("touch", "same").unwrap(), Some("same".to_string()));
    }
}
