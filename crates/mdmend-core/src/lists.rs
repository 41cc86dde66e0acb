//! List-shaping rules: metadata-label listification, warning-line
//! listification, lettered sub-list renumbering, and numbered-list spacing.

use crate::segment::split_eol;
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Shared line shapes
// ---------------------------------------------------------------------------

static LIST_LINE_RE: OnceLock<Regex> = OnceLock::new();
static NUMBERED_ITEM_RE: OnceLock<Regex> = OnceLock::new();
static METADATA_RE: OnceLock<Regex> = OnceLock::new();
static LABEL_ONLY_RE: OnceLock<Regex> = OnceLock::new();
static LETTERED_RE: OnceLock<Regex> = OnceLock::new();

fn list_line_re() -> &'static Regex {
    LIST_LINE_RE.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|[0-9]+\.)\s").unwrap())
}

fn numbered_item_re() -> &'static Regex {
    NUMBERED_ITEM_RE.get_or_init(|| Regex::new(r"^[0-9]+\. ").unwrap())
}

fn metadata_re() -> &'static Regex {
    // `**Label:**` or `**Label**:` at line start, content after allowed.
    METADATA_RE.get_or_init(|| Regex::new(r"^\*\*[^*]+(?::\*\*|\*\*:)").unwrap())
}

fn label_only_re() -> &'static Regex {
    LABEL_ONLY_RE.get_or_init(|| Regex::new(r"^\*\*[^*]+(?::\*\*|\*\*:)\s*$").unwrap())
}

fn lettered_re() -> &'static Regex {
    LETTERED_RE.get_or_init(|| Regex::new(r"^([a-z])\. (.+)$").unwrap())
}

fn is_list_line(line: &str) -> bool {
    list_line_re().is_match(line)
}

fn is_label_only(line: &str) -> bool {
    label_only_re().is_match(line)
}

// ---------------------------------------------------------------------------
// Metadata blocks
// ---------------------------------------------------------------------------

/// Convert runs of 2+ consecutive `**Label:**` lines into a bulleted list.
/// A list directly following the run (no intervening blank) is nested under
/// it with 2 extra spaces of indentation. Single label lines are left for
/// [`indent_list_under_metadata_label`].
pub fn listify_metadata_blocks(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if !metadata_re().is_match(&lines[i]) {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        let mut j = i;
        while j < lines.len() && metadata_re().is_match(&lines[j]) {
            j += 1;
        }
        if j - i < 2 {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        for line in &lines[i..j] {
            out.push(format!("- {line}"));
        }
        i = j;
        while i < lines.len() && is_list_line(&lines[i]) {
            out.push(format!("  {}", lines[i]));
            i += 1;
        }
    }
    out
}

/// Turn a lone `**Label:**` line directly followed by a list into one bullet
/// with the list nested beneath it. The indent run ends at a blank line
/// (copied through) or the first non-list line.
pub fn indent_list_under_metadata_label(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let followed_by_list = lines.get(i + 1).is_some_and(|l| is_list_line(l));
        if !(is_label_only(&lines[i]) && followed_by_list) {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        out.push(format!("- {}", lines[i]));
        i += 1;
        while i < lines.len() {
            if lines[i].trim().is_empty() {
                out.push(lines[i].clone());
                i += 1;
                break;
            }
            if !is_list_line(&lines[i]) {
                break;
            }
            out.push(format!("  {}", lines[i]));
            i += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Warning / symbol prefixes
// ---------------------------------------------------------------------------

static EMOJI_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
static BRACKET_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
static COLON_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn emoji_prefix_re() -> &'static Regex {
    // Leading symbols that are not alphanumerics, whitespace, or common
    // markdown/list/table punctuation. Spelled out instead of `\w` so that
    // combining marks (emoji variation selectors) stay in the run.
    EMOJI_PREFIX_RE.get_or_init(|| Regex::new(r"^[^\p{Alphabetic}\p{Nd}_\s\[({\-*|>`]+(?: |$)").unwrap())
}

fn bracket_prefix_re() -> &'static Regex {
    BRACKET_PREFIX_RE.get_or_init(|| Regex::new(r"^\[[^\]]*\](?: |$)").unwrap())
}

fn colon_prefix_re() -> &'static Regex {
    COLON_PREFIX_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*: ").unwrap())
}

/// The three prefix shapes that make consecutive lines mergeable into one
/// bulleted list. Similarity is same-class only: an emoji line and a
/// `NOTE:` line never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixClass {
    Emoji,
    Bracket,
    Colon,
}

fn classify_prefix(line: &str) -> Option<PrefixClass> {
    if is_list_line(line) || is_block_quote(line) || is_table_row(line) || is_tree_line(line) {
        return None;
    }
    let content = line.trim_end();
    if emoji_prefix_re().is_match(content) {
        Some(PrefixClass::Emoji)
    } else if bracket_prefix_re().is_match(content) {
        Some(PrefixClass::Bracket)
    } else if colon_prefix_re().is_match(content) {
        Some(PrefixClass::Colon)
    } else {
        None
    }
}

fn is_block_quote(line: &str) -> bool {
    line.starts_with('>')
}

fn is_table_row(line: &str) -> bool {
    line.starts_with('|') && line.matches('|').count() >= 2
}

fn is_tree_line(line: &str) -> bool {
    line.chars()
        .take(3)
        .any(|c| matches!(c, '├' | '└' | '│'))
}

/// Convert runs of 2+ consecutive lines with similar prefixes (emoji
/// symbols, `[TAG]`, `NOTE:`) into a bulleted list. Existing list items,
/// table rows, block quotes, and tree diagrams are never candidates.
pub fn listify_warning_lines(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let Some(class) = classify_prefix(&lines[i]) else {
            out.push(lines[i].clone());
            i += 1;
            continue;
        };
        let mut j = i + 1;
        while j < lines.len() && classify_prefix(&lines[j]) == Some(class) {
            j += 1;
        }
        if j - i < 2 {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        for line in &lines[i..j] {
            out.push(format!("- {line}"));
        }
        i = j;
    }
    out
}

// ---------------------------------------------------------------------------
// Lettered sub-lists
// ---------------------------------------------------------------------------

/// Rewrite lettered sub-list markers (`a.`, `b.`, …) as ordinal numbers
/// (`1.`, `2.`, …), preserving indentation.
pub fn renumber_lettered_sublists(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| renumber_line(l)).collect()
}

fn renumber_line(line: &str) -> String {
    let (content, eol) = split_eol(line);
    let stripped = content.trim_start();
    let indent = &content[..content.len() - stripped.len()];
    let Some(caps) = lettered_re().captures(stripped) else {
        return line.to_string();
    };
    let ordinal = (caps[1].as_bytes()[0] - b'a') as u32 + 1;
    format!("{indent}{ordinal}. {}{eol}", &caps[2])
}

// ---------------------------------------------------------------------------
// Numbered-list spacing
// ---------------------------------------------------------------------------

/// Ensure a blank line separates a numbered list from preceding prose (or a
/// lone `**Label:**` line) without ever splitting a list that is already
/// open. Indented continuation lines keep the list open; a blank line or
/// any other line closes it.
pub fn normalize_numbered_list_spacing(lines: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_numbered_list = false;
    for line in lines {
        let blank = line.trim().is_empty();
        let numbered = numbered_item_re().is_match(line);
        if numbered {
            if !in_numbered_list {
                if let Some(prev) = out.last() {
                    if !prev.trim().is_empty() && !is_list_line(prev) {
                        out.push("\n".to_string());
                    }
                }
            }
            in_numbered_list = true;
            out.push(line.clone());
        } else if blank {
            in_numbered_list = false;
            out.push(line.clone());
        } else if in_numbered_list && (line.starts_with(' ') || line.starts_with('\t')) {
            // indented continuation keeps the list open
            out.push(line.clone());
        } else {
            in_numbered_list = false;
            out.push(line.clone());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
