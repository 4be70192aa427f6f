//! Tag names and tag patterns.
//!
//! Tags are plain, case-sensitive strings. The only normalization applied on
//! input is dropping one leading and one trailing space, so that `" rust "`
//! typed at a prompt is stored as `rust`. Anything else that would leave
//! surrounding whitespace, an empty name or a line break is rejected.
//!
//! Patterns use a single wildcard, `*`, matching any run of characters
//! (including none):
//!
//! | pattern   | matches                                   |
//! |-----------|-------------------------------------------|
//! | `rust`    | exactly `rust`                            |
//! | `ru*`     | tags starting with `ru`                   |
//! | `*st`     | tags ending with `st`                     |
//! | `*a*t*a`  | `a`, then `t`, then a final `a`           |
//! | `*`, `**` | every tag                                 |
//! | (empty)   | only the empty string, i.e. nothing       |

use crate::error::{PensiveError, Result};

/// Normalizes user input into a tag name.
///
/// ```
/// use pensive::tags::normalize_tag;
///
/// assert_eq!(normalize_tag(" rust ").unwrap(), "rust");
/// assert_eq!(normalize_tag("c++").unwrap(), "c++");
/// assert!(normalize_tag("  rust").is_err());
/// assert!(normalize_tag("").is_err());
/// ```
pub fn normalize_tag(input: &str) -> Result<String> {
    let name = input.strip_prefix(' ').unwrap_or(input);
    let name = name.strip_suffix(' ').unwrap_or(name);

    if name.is_empty() {
        return Err(PensiveError::InvalidName(input.to_string()));
    }
    if name.trim() != name || name.contains(['\n', '\r']) {
        return Err(PensiveError::InvalidName(input.to_string()));
    }
    Ok(name.to_string())
}

/// Returns true if `tag` matches the `*` glob `pattern`.
///
/// The pattern is split on `*` into literal slices. Each non-empty slice must
/// be found in order, leftmost first, without overlapping the previous one.
/// A pattern not starting with `*` pins its first slice to the start of the
/// tag; one not ending with `*` pins its last slice to the end.
pub fn glob_match(pattern: &str, tag: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == tag;
    }

    let slices: Vec<&str> = pattern.split('*').collect();
    let anchored_start = !pattern.starts_with('*');
    let anchored_end = !pattern.ends_with('*');
    let last = slices.len() - 1;
    let mut cursor = 0;

    for (i, slice) in slices.iter().enumerate() {
        if slice.is_empty() {
            continue;
        }
        if i == 0 && anchored_start {
            if !tag.starts_with(slice) {
                return false;
            }
            cursor = slice.len();
            continue;
        }
        if i == last && anchored_end {
            return tag.len() >= cursor + slice.len() && tag.ends_with(slice);
        }
        match tag[cursor..].find(slice) {
            Some(offset) => cursor += offset + slice.len(),
            None => return false,
        }
    }
    true
}

/// All tags matching `pattern`, in tag order.
pub fn match_tags<'a, I>(pattern: &str, tags: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut matched: Vec<String> = tags
        .into_iter()
        .filter(|tag| glob_match(pattern, tag))
        .cloned()
        .collect();
    matched.sort();
    matched
}
