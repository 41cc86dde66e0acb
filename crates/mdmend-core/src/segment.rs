//! Splits a markdown document into protected and processable segments.
//!
//! Protected segments (code fences without a `markdown` tag, YAML prologs)
//! pass through the fix pipeline untouched; processable segments are fair
//! game. Parsing is lossless: flattening the segments in order reproduces
//! the input byte for byte.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Language tag that marks a fenced block as processable markdown.
pub const MARKDOWN_TAG: &str = "markdown";

/// Pseudo-language assigned to YAML prolog segments.
pub const YAML_PROLOG_TAG: &str = "yaml-prolog";

/// A maximal contiguous run of lines classified uniformly by the parser.
///
/// `lines` keep their trailing terminators; `start_line` is the 0-based
/// offset of the first line in the original document.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub processable: bool,
    pub language: Option<String>,
    pub lines: Vec<String>,
    pub start_line: usize,
}

impl Segment {
    /// A copy of this segment with the same classification but new lines.
    pub fn with_lines(&self, lines: Vec<String>) -> Segment {
        Segment {
            processable: self.processable,
            language: self.language.clone(),
            lines,
            start_line: self.start_line,
        }
    }
}

// ---------------------------------------------------------------------------
// Line-shape helpers
// ---------------------------------------------------------------------------

static PROLOG_KEY_RE: OnceLock<Regex> = OnceLock::new();

fn prolog_key_re() -> &'static Regex {
    // Identifier-like key followed by a colon; the value is optional.
    PROLOG_KEY_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][\w-]*:").unwrap())
}

/// Length of the leading backtick run and the trimmed text after it, if the
/// whitespace-stripped line starts with a backtick.
pub(crate) fn fence_signature(line: &str) -> Option<(usize, Option<String>)> {
    let stripped = line.trim();
    let run = stripped.chars().take_while(|&c| c == '`').count();
    if run == 0 {
        return None;
    }
    let tag = stripped[run..].trim();
    let tag = if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    };
    Some((run, tag))
}

/// Split a line into its content and trailing terminator.
pub(crate) fn split_eol(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

// ---------------------------------------------------------------------------
// Fence and prolog scanning
// ---------------------------------------------------------------------------

/// Index of the line closing the fence opened at `open`, or the last line of
/// the document when the fence is unterminated.
///
/// The scan keeps an explicit stack of `(run length, language)` frames: a
/// run matching the top frame's length pushes when a tag follows it and pops
/// when bare. Runs of any other length are not fence events at that frame.
fn fence_block_end(lines: &[String], open: usize, open_len: usize, open_tag: &Option<String>) -> usize {
    let mut stack: Vec<(usize, Option<String>)> = vec![(open_len, open_tag.clone())];
    let mut i = open + 1;
    while i < lines.len() {
        if let Some((run, tag)) = fence_signature(&lines[i]) {
            let top_len = stack.last().map(|f| f.0).unwrap_or(open_len);
            if run == top_len {
                if tag.is_none() {
                    stack.pop();
                    if stack.is_empty() {
                        return i;
                    }
                } else {
                    stack.push((run, tag));
                }
            }
        }
        i += 1;
    }
    lines.len() - 1
}

/// Index of the `---` closing a YAML prolog opened at `open`, if the
/// candidate really is a prolog: the line after the opener is non-blank, no
/// blank line appears before the closer, and at least one content line looks
/// like a `key:` entry. Anything else falls through to plain text, which is
/// how a `---` horizontal rule survives.
fn yaml_prolog_end(lines: &[String], open: usize) -> Option<usize> {
    let first = lines.get(open + 1)?;
    if first.trim().is_empty() {
        return None;
    }
    let mut saw_key = false;
    let mut i = open + 1;
    while i < lines.len() {
        let stripped = lines[i].trim();
        if stripped == "---" {
            return if saw_key { Some(i) } else { None };
        }
        if stripped.is_empty() {
            return None;
        }
        if prolog_key_re().is_match(stripped) {
            saw_key = true;
        }
        i += 1;
    }
    None
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn flush_plain(segments: &mut Vec<Segment>, plain: &mut Vec<String>, start: usize) {
    if !plain.is_empty() {
        segments.push(Segment {
            processable: true,
            language: None,
            lines: std::mem::take(plain),
            start_line: start,
        });
    }
}

/// Classify every line of `lines` into ordered segments.
///
/// A fenced block is protected unless its opening tag is exactly
/// [`MARKDOWN_TAG`]; a `markdown` fence with interior content is parsed
/// recursively so fences nested inside it are recognized (and protected)
/// themselves. Never fails on text input.
pub fn parse_segments(lines: &[String]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain: Vec<String> = Vec::new();
    let mut plain_start = 0usize;
    let mut i = 0usize;

    while i < lines.len() {
        if let Some((run, tag)) = fence_signature(&lines[i]) {
            flush_plain(&mut segments, &mut plain, plain_start);
            let end = fence_block_end(lines, i, run, &tag);
            let is_markdown = tag.as_deref() == Some(MARKDOWN_TAG);
            if is_markdown && end - i >= 2 {
                // Boundary lines stay their own processable segments; the
                // interior is parsed recursively with offsets shifted.
                segments.push(Segment {
                    processable: true,
                    language: tag.clone(),
                    lines: vec![lines[i].clone()],
                    start_line: i,
                });
                let mut inner = parse_segments(&lines[i + 1..end]);
                for seg in &mut inner {
                    seg.start_line += i + 1;
                }
                segments.append(&mut inner);
                segments.push(Segment {
                    processable: true,
                    language: tag,
                    lines: vec![lines[end].clone()],
                    start_line: end,
                });
            } else {
                segments.push(Segment {
                    processable: is_markdown,
                    language: tag,
                    lines: lines[i..=end].to_vec(),
                    start_line: i,
                });
            }
            i = end + 1;
        } else if lines[i].trim() == "---" {
            match yaml_prolog_end(lines, i) {
                Some(end) => {
                    flush_plain(&mut segments, &mut plain, plain_start);
                    segments.push(Segment {
                        processable: false,
                        language: Some(YAML_PROLOG_TAG.to_string()),
                        lines: lines[i..=end].to_vec(),
                        start_line: i,
                    });
                    i = end + 1;
                }
                None => {
                    if plain.is_empty() {
                        plain_start = i;
                    }
                    plain.push(lines[i].clone());
                    i += 1;
                }
            }
        } else {
            if plain.is_empty() {
                plain_start = i;
            }
            plain.push(lines[i].clone());
            i += 1;
        }
    }
    flush_plain(&mut segments, &mut plain, plain_start);
    segments
}

/// Reassemble a line sequence from segments. Inverse of [`parse_segments`].
pub fn flatten_segments(segments: &[Segment]) -> Vec<String> {
    segments
        .iter()
        .flat_map(|s| s.lines.iter().cloned())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
