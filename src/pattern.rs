//! Regular expression testing with JavaScript-style flags.
//!
//! Flags are the familiar `g i m s u y` set. `g` is always in effect: the
//! scanner walks the whole input no matter what the caller asked for, and the
//! reported flag string carries a leading `g` when the caller left it out.
//!
//! Patterns use the `regex` crate syntax, which covers named groups
//! (`(?<name>...)` and `(?P<name>...)`) but has no backreferences or
//! lookaround. Patterns using those fail to compile and are reported as
//! invalid.

use crate::error::{ToolError, ToolResult};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compiled program size cap; keeps hostile patterns from eating memory.
const SIZE_LIMIT: usize = 1 << 22;

/// Every flag the tester understands, with a short description.
pub const SUPPORTED_FLAGS: &[(char, &str)] = &[
    ('g', "Global search"),
    ('i', "Case-insensitive search"),
    ('m', "Multiline search"),
    ('s', "Allows . to match newline characters"),
    ('u', "Unicode; treat pattern as a sequence of unicode code points"),
    ('y', "Sticky search"),
];

/// Parsed flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub sticky: bool,
}

impl RegexFlags {
    /// Parse a flag string. Unknown and repeated flags are errors.
    pub fn parse(flags: &str) -> ToolResult<Self> {
        let mut out = RegexFlags::default();
        for flag in flags.chars() {
            let slot = match flag {
                'g' => &mut out.global,
                'i' => &mut out.case_insensitive,
                'm' => &mut out.multi_line,
                's' => &mut out.dot_all,
                'u' => &mut out.unicode,
                'y' => &mut out.sticky,
                other => {
                    return Err(ToolError::InvalidFormat(format!(
                        "Invalid regular expression flag '{other}'"
                    )))
                }
            };
            if *slot {
                return Err(ToolError::InvalidFormat(format!(
                    "Duplicate regular expression flag '{flag}'"
                )));
            }
            *slot = true;
        }
        Ok(out)
    }
}

/// The flag string actually applied: `flags` with `g` prepended if absent.
pub fn effective_flags(flags: &str) -> String {
    if flags.contains('g') {
        flags.to_string()
    } else {
        format!("g{flags}")
    }
}

/// One hit in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexMatch {
    #[serde(rename = "match")]
    pub text: String,
    /// Start of the match, counted in characters.
    pub index: usize,
    /// Named captures; absent when the pattern has no named groups.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub groups: Option<BTreeMap<String, Option<String>>>,
}

/// Compile `pattern` under `flags`.
pub fn compile(pattern: &str, flags: &str) -> ToolResult<(Regex, RegexFlags)> {
    let parsed = RegexFlags::parse(flags)?;
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(parsed.case_insensitive)
        .multi_line(parsed.multi_line)
        .dot_matches_new_line(parsed.dot_all)
        .size_limit(SIZE_LIMIT)
        .build()
        .map_err(|e| ToolError::InvalidFormat(format!("Invalid regex pattern: {e}")))?;
    Ok((regex, parsed))
}

/// Returns true if `pattern` compiles under `flags`.
pub fn is_valid_pattern(pattern: &str, flags: &str) -> bool {
    compile(pattern, flags).is_ok()
}

/// Scan `text` left to right and collect every match.
///
/// An empty match moves the cursor one character forward so the scan always
/// terminates. With `sticky`, scanning stops at the first position where the
/// next match does not begin exactly at the cursor.
pub fn find_all(text: &str, regex: &Regex, sticky: bool) -> Vec<RegexMatch> {
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    let mut matches = Vec::new();

    let mut cursor = 0usize;
    // byte offset / char count pair for incremental index conversion
    let mut counted = (0usize, 0usize);

    while cursor <= text.len() {
        let Some(caps) = regex.captures_at(text, cursor) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if sticky && whole.start() != cursor {
            break;
        }

        counted.1 += text[counted.0..whole.start()].chars().count();
        counted.0 = whole.start();

        let groups = (!names.is_empty()).then(|| {
            names
                .iter()
                .map(|name| {
                    let value = caps.name(name).map(|m| m.as_str().to_string());
                    (name.to_string(), value)
                })
                .collect()
        });

        matches.push(RegexMatch {
            text: whole.as_str().to_string(),
            index: counted.1,
            groups,
        });

        cursor = if whole.is_empty() {
            text[whole.end()..]
                .chars()
                .next()
                .map_or(text.len() + 1, |c| whole.end() + c.len_utf8())
        } else {
            whole.end()
        };
    }

    matches
}

/// Compile and scan in one go, always in global mode.
pub fn find_all_matches(text: &str, pattern: &str, flags: &str) -> ToolResult<Vec<RegexMatch>> {
    let (regex, parsed) = compile(pattern, flags)?;
    tracing::trace!(pattern, flags, "regex compiled");
    Ok(find_all(text, &regex, parsed.sticky))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_literal_match() {
        let found = find_all_matches("hello world", "world", "").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "world");
        assert_eq!(found[0].index, 6);
        assert!(found[0].groups.is_none());
    }

    #[test]
    fn case_insensitive_finds_all() {
        let found = find_all_matches("Hello HELLO hello", "hello", "i").unwrap();
        assert_eq!(found.len(), 3);
        let indices: Vec<usize> = found.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 6, 12]);
    }

    #[test]
    fn multiline_anchors() {
        let found = find_all_matches("line1\nline2\nline3", "^line", "m").unwrap();
        assert_eq!(found.len(), 3);
        let found = find_all_matches("line1\nline2\nline3", "^line", "").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn named_groups_are_reported() {
        let found =
            find_all_matches("2021-01 2022-12", r"(?<year>\d{4})-(?<month>\d{2})", "").unwrap();
        assert_eq!(found.len(), 2);
        let groups = found[1].groups.as_ref().unwrap();
        assert_eq!(groups["year"].as_deref(), Some("2022"));
        assert_eq!(groups["month"].as_deref(), Some("12"));
    }

    #[test]
    fn unmatched_named_group_is_null() {
        let found = find_all_matches("ab", r"a(?<x>z)?", "").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].groups.as_ref().unwrap()["x"], None);
    }

    #[test]
    fn empty_matches_advance() {
        let found = find_all_matches("abc", "x*", "").unwrap();
        // one empty match at every position, end included
        assert_eq!(found.len(), 4);
        assert!(found.iter().all(|m| m.text.is_empty()));
        assert_eq!(found[3].index, 3);
    }

    #[test]
    fn index_counts_characters() {
        let found = find_all_matches("héllo wörld", "w", "").unwrap();
        assert_eq!(found[0].index, 6);
        let found = find_all_matches("ééé", "", "").unwrap();
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn sticky_stops_at_gap() {
        let found = find_all_matches("aaba", "a", "y").unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn invalid_patterns_and_flags() {
        assert!(!is_valid_pattern("(", ""));
        assert!(!is_valid_pattern("a", "q"));
        assert!(!is_valid_pattern("a", "ii"));
        assert!(is_valid_pattern("a", "gimsuy"));
    }

    #[test]
    fn global_flag_is_forced() {
        assert_eq!(effective_flags("i"), "gi");
        assert_eq!(effective_flags("gi"), "gi");
        assert_eq!(effective_flags(""), "g");
    }
}
