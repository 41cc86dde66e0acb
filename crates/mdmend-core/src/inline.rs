//! Inline rewrite rules: dunder wrapping, backtick-run escaping, and
//! whitespace-explicit span quoting. Each rule is a pure `lines -> lines`
//! function and leaves already-fixed constructs alone.

use crate::segment::split_eol;
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Dunder references
// ---------------------------------------------------------------------------

static DUNDER_RE: OnceLock<Regex> = OnceLock::new();

fn dunder_re() -> &'static Regex {
    // The optional surrounding backticks are part of the match so an
    // already-wrapped reference can be recognized without lookaround.
    DUNDER_RE.get_or_init(|| Regex::new(r"`?__[A-Za-z0-9_]+__(?:\.py)?`?").unwrap())
}

/// Wrap bare dunder references (`__init__`, `__main__.py`) on heading lines
/// in backticks so renderers don't read them as bold markers. Non-heading
/// lines pass through untouched.
pub fn wrap_dunder_references(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| wrap_dunder_line(l)).collect()
}

fn wrap_dunder_line(line: &str) -> String {
    if !line.starts_with('#') {
        return line.to_string();
    }
    dunder_re()
        .replace_all(line, |caps: &regex::Captures| {
            let m = &caps[0];
            if m.starts_with('`') || m.ends_with('`') {
                m.to_string()
            } else {
                format!("`{m}`")
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Backtick-run escaping
// ---------------------------------------------------------------------------

/// Escape backtick runs of 3+ that appear in prose so renderers don't read
/// them as fence delimiters. The run and any token attached to it are
/// wrapped in `` `` … `` `` delimiters. Genuine inline code spans (1–2
/// backtick delimiters paired with the next run of equal length) protect
/// their interior, which also makes this function idempotent: its own
/// output forms a genuine 2-backtick span.
///
/// Carries its own fence toggle so it stays safe when called on raw lines
/// without segment protection.
pub fn escape_inline_backticks(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut in_code_block = false;
    for line in lines {
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
            out.push(line.clone());
            continue;
        }
        if in_code_block {
            out.push(line.clone());
            continue;
        }
        out.push(escape_line(line));
    }
    out
}

fn escape_line(line: &str) -> String {
    let (content, eol) = split_eol(line);
    let runs = backtick_runs(content);
    if !runs.iter().any(|&(_, len)| len >= 3) {
        return line.to_string();
    }
    let spans = matched_span_ranges(&runs);
    let mut result = String::with_capacity(content.len() + 8);
    let mut cursor = 0usize;
    for &(start, len) in &runs {
        if len < 3 || spans.iter().any(|&(a, b)| start >= a && start < b) {
            continue;
        }
        let end = attached_token_end(content, start + len);
        result.push_str(&content[cursor..start]);
        result.push_str("`` ");
        result.push_str(&content[start..end]);
        result.push_str(" ``");
        cursor = end;
    }
    result.push_str(&content[cursor..]);
    result.push_str(eol);
    result
}

/// Byte ranges of leading backtick runs: `(start, length)` per run.
fn backtick_runs(s: &str) -> Vec<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'`' {
                i += 1;
            }
            runs.push((start, i - start));
        } else {
            i += 1;
        }
    }
    runs
}

/// Byte ranges covered by genuine inline code spans. Only 1–2 backtick runs
/// may open a span; the closer is the next run of exactly the same length.
fn matched_span_ranges(runs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < runs.len() {
        let (start, len) = runs[i];
        if len <= 2 {
            if let Some(off) = runs[i + 1..].iter().position(|&(_, l)| l == len) {
                let j = i + 1 + off;
                let (close_start, close_len) = runs[j];
                ranges.push((start, close_start + close_len));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    ranges
}

fn attached_token_end(s: &str, from: usize) -> usize {
    let mut end = from;
    for c in s[from..].chars() {
        if c.is_whitespace() || c == '`' {
            break;
        }
        end += c.len_utf8();
    }
    end
}

// ---------------------------------------------------------------------------
// Whitespace-padded spans
// ---------------------------------------------------------------------------

static SPAN_RE: OnceLock<Regex> = OnceLock::new();

fn span_re() -> &'static Regex {
    SPAN_RE.get_or_init(|| Regex::new(r"`([^`\n]+)`").unwrap())
}

/// Make leading or trailing spaces inside single-backtick spans visible by
/// double-quoting the span content. Lines that already contain a
/// double-backtick sequence are skipped wholesale.
pub fn quote_spaced_backtick_spans(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| quote_spaced_line(l)).collect()
}

fn quote_spaced_line(line: &str) -> String {
    if line.contains("``") {
        return line.to_string();
    }
    span_re()
        .replace_all(line, |caps: &regex::Captures| {
            let content = &caps[1];
            if content.starts_with(' ') || content.ends_with(' ') {
                format!("`\"{content}\"`")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| format!("{l}\n")).collect()
    }

    // -- dunder wrapping ----------------------------------------------------

    #[test]
    fn wraps_dunder_in_heading() {
        let out = wrap_dunder_references(&doc(&["## About __init__.py"]));
        assert_eq!(out, doc(&["## About `__init__.py`"]));
    }

    #[test]
    fn wraps_dunder_without_extension() {
        let out = wrap_dunder_references(&doc(&["# The __main__ module"]));
        assert_eq!(out, doc(&["# The `__main__` module"]));
    }

    #[test]
    fn leaves_non_heading_lines_alone() {
        let lines = doc(&["__init__.py is special"]);
        assert_eq!(wrap_dunder_references(&lines), lines);
    }

    #[test]
    fn dunder_wrapping_is_idempotent() {
        let once = wrap_dunder_references(&doc(&["## About __init__.py"]));
        assert_eq!(wrap_dunder_references(&once), once);
    }

    #[test]
    fn already_wrapped_dunder_is_untouched() {
        let lines = doc(&["## About `__init__.py`"]);
        assert_eq!(wrap_dunder_references(&lines), lines);
    }

    // -- backtick escaping --------------------------------------------------

    #[test]
    fn escapes_fence_run_in_prose() {
        let out = escape_inline_backticks(&doc(&["Text about ```markdown blocks"]));
        assert_eq!(out, doc(&["Text about `` ```markdown `` blocks"]));
    }

    #[test]
    fn escaping_is_idempotent() {
        let once = escape_inline_backticks(&doc(&["Text about ```markdown blocks"]));
        assert_eq!(escape_inline_backticks(&once), once);
    }

    #[test]
    fn bare_run_without_token_is_escaped() {
        let out = escape_inline_backticks(&doc(&["use ``` to fence"]));
        assert_eq!(out, doc(&["use `` ``` `` to fence"]));
    }

    #[test]
    fn short_spans_are_left_alone() {
        let lines = doc(&["call `foo` and ``bar``"]);
        assert_eq!(escape_inline_backticks(&lines), lines);
    }

    #[test]
    fn run_inside_genuine_span_is_protected() {
        let lines = doc(&["a `x ``` y` b"]);
        assert_eq!(escape_inline_backticks(&lines), lines);
    }

    #[test]
    fn fenced_lines_are_skipped_by_toggle() {
        let lines = doc(&["```", "look at ```markdown here", "```"]);
        assert_eq!(escape_inline_backticks(&lines), lines);
    }

    #[test]
    fn escapes_multiple_runs_on_one_line() {
        let out = escape_inline_backticks(&doc(&["``` and ````"]));
        assert_eq!(out, doc(&["`` ``` `` and `` ```` ``"]));
    }

    // -- spaced-span quoting ------------------------------------------------

    #[test]
    fn quotes_span_with_trailing_space() {
        let out = quote_spaced_backtick_spans(&doc(&["push ` foo ` now"]));
        assert_eq!(out, doc(&["push `\" foo \"` now"]));
    }

    #[test]
    fn quotes_span_with_leading_space_only() {
        let out = quote_spaced_backtick_spans(&doc(&["a ` x` b"]));
        assert_eq!(out, doc(&["a `\" x\"` b"]));
    }

    #[test]
    fn unpadded_span_is_untouched() {
        let lines = doc(&["call `foo` here"]);
        assert_eq!(quote_spaced_backtick_spans(&lines), lines);
    }

    #[test]
    fn lines_with_double_backticks_are_skipped() {
        let lines = doc(&["`` ```markdown `` and ` bad `"]);
        assert_eq!(quote_spaced_backtick_spans(&lines), lines);
    }

    #[test]
    fn quoting_is_idempotent() {
        let once = quote_spaced_backtick_spans(&doc(&["push ` foo ` now"]));
        assert_eq!(quote_spaced_backtick_spans(&once), once);
    }
}
