//! Repair for 3-backtick fenced blocks that contain fences themselves.
//!
//! A `markdown` block is recoverable: its delimiters are widened to 4
//! backticks so the inner fence no longer collides. Any other block is an
//! unrecoverable ambiguity and fails with [`MendError::InnerFence`].

use crate::error::{MendError, Result};
use crate::segment::fence_signature;

/// Widen 3-backtick `markdown` fences that contain an inner fence. Blocks
/// opened with 4+ backticks are skipped wholesale; an unterminated block is
/// left as-is (it runs to end of file, so there is no closing line to edit).
pub fn widen_nested_markdown_fences(lines: &[String]) -> Result<Vec<String>> {
    let mut out = lines.to_vec();
    let mut i = 0;
    while i < lines.len() {
        let Some((run, tag)) = fence_signature(&lines[i]) else {
            i += 1;
            continue;
        };
        if run < 3 {
            i += 1;
            continue;
        }
        if run > 3 {
            i = skip_block(lines, i, run) + 1;
            continue;
        }
        let (close, inner) = scan_block(lines, i);
        if !inner {
            match close {
                Some(end) => i = end + 1,
                None => break,
            }
            continue;
        }
        if tag.as_deref() != Some(crate::segment::MARKDOWN_TAG) {
            return Err(MendError::InnerFence {
                language: tag.unwrap_or_else(|| "none".to_string()),
                line: i + 1,
            });
        }
        match close {
            Some(end) => {
                out[i] = widen(&lines[i]);
                out[end] = widen(&lines[end]);
                i = end + 1;
            }
            None => break,
        }
    }
    Ok(out)
}

/// Scan the block opened at `open` for its closing fence and any inner
/// fence. An inner fence is: a run longer than 3, a 3-run opening fence
/// with a tag, an indented bare 3-run (a marker buried in content that
/// cannot close the block), or a bare 3-run that opens a nested block (an
/// opening fence follows it before the next bare 3-run).
fn scan_block(lines: &[String], open: usize) -> (Option<usize>, bool) {
    let mut depth = 1usize;
    let mut inner = false;
    let mut j = open + 1;
    while j < lines.len() {
        if let Some((run, tag)) = fence_signature(&lines[j]) {
            if run > 3 {
                inner = true;
            } else if run == 3 {
                if tag.is_some() {
                    inner = true;
                    depth += 1;
                } else if is_indented(&lines[j]) {
                    inner = true;
                } else if depth == 1 && bare_opens_nested_block(lines, j) {
                    inner = true;
                    depth += 1;
                } else {
                    depth -= 1;
                    if depth == 0 {
                        return (Some(j), inner);
                    }
                }
            }
        }
        j += 1;
    }
    (None, inner)
}

/// True when a bare 3-run is followed by another opening fence before the
/// next bare 3-run, meaning it opens a nested block rather than closing the
/// current one.
fn bare_opens_nested_block(lines: &[String], from: usize) -> bool {
    for line in &lines[from + 1..] {
        if let Some((run, tag)) = fence_signature(line) {
            if run == 3 && tag.is_none() {
                return false;
            }
            if run > 3 || (run == 3 && tag.is_some()) {
                return true;
            }
        }
    }
    false
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// Delimiter-only edit: the first 3-backtick run gains one backtick.
fn widen(line: &str) -> String {
    line.replacen("```", "````", 1)
}

fn skip_block(lines: &[String], open: usize, open_len: usize) -> usize {
    let mut j = open + 1;
    while j < lines.len() {
        if let Some((run, tag)) = fence_signature(&lines[j]) {
            if run == open_len && tag.is_none() {
                return j;
            }
        }
        j += 1;
    }
    lines.len() - 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
