//! The fix pipeline: one fixed, documented order, with segment protection
//! for every fix that must not touch code fences or YAML prologs.

use crate::error::Result;
use crate::fences::widen_nested_markdown_fences;
use crate::inline::{escape_inline_backticks, quote_spaced_backtick_spans, wrap_dunder_references};
use crate::lists::{
    indent_list_under_metadata_label, listify_metadata_blocks, listify_warning_lines,
    normalize_numbered_list_spacing, renumber_lettered_sublists,
};
use crate::segment::{flatten_segments, parse_segments};

/// Apply `fix` to every processable segment, leaving protected segments
/// untouched, and reassemble the document.
pub fn apply_fix_to_segments<F>(lines: &[String], fix: F) -> Vec<String>
where
    F: Fn(&[String]) -> Vec<String>,
{
    let segments: Vec<_> = parse_segments(lines)
        .into_iter()
        .map(|seg| {
            if seg.processable {
                let fixed = fix(&seg.lines);
                seg.with_lines(fixed)
            } else {
                seg
            }
        })
        .collect();
    flatten_segments(&segments)
}

/// Run the full fix pipeline over a document.
///
/// The order is fixed: fence repair first (it edits the delimiters that
/// segmentation depends on), then the per-line dunder rule, then the
/// segment-protected fixes — escaping before span quoting, the wide
/// metadata rule before the narrow one, spacing after everything that
/// creates list lines. See DESIGN.md for the rationale. The whole pipeline
/// is idempotent.
pub fn process_lines(lines: &[String]) -> Result<Vec<String>> {
    let lines = widen_nested_markdown_fences(lines)?;
    let lines = wrap_dunder_references(&lines);
    let lines = apply_fix_to_segments(&lines, escape_inline_backticks);
    let lines = apply_fix_to_segments(&lines, listify_metadata_blocks);
    let lines = apply_fix_to_segments(&lines, indent_list_under_metadata_label);
    let lines = apply_fix_to_segments(&lines, listify_warning_lines);
    let lines = apply_fix_to_segments(&lines, renumber_lettered_sublists);
    let lines = apply_fix_to_segments(&lines, normalize_numbered_list_spacing);
    Ok(apply_fix_to_segments(&lines, quote_spaced_backtick_spans))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MendError;

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| format!("{l}\n")).collect()
    }

    #[test]
    fn heading_dunder_is_wrapped() {
        let out = process_lines(&doc(&["## About __init__.py"])).unwrap();
        assert_eq!(out, doc(&["## About `__init__.py`"]));
    }

    #[test]
    fn protected_fence_interior_is_byte_identical() {
        let lines = doc(&[
            "```",
            "⚠️ warning one",
            "⚠️ warning two",
            "**File:** a.md",
            "**Model:** Sonnet",
            "```",
        ]);
        assert_eq!(process_lines(&lines).unwrap(), lines);
    }

    #[test]
    fn yaml_prolog_is_untouched() {
        let lines = doc(&["---", "title: x", "tags: y", "---", "body"]);
        assert_eq!(process_lines(&lines).unwrap(), lines);
    }

    #[test]
    fn markdown_fence_interior_is_processed() {
        let out = process_lines(&doc(&[
            "```markdown",
            "**File:** a.md",
            "**Model:** Sonnet",
            "```",
        ]))
        .unwrap();
        assert_eq!(
            out,
            doc(&[
                "```markdown",
                "- **File:** a.md",
                "- **Model:** Sonnet",
                "```",
            ])
        );
    }

    #[test]
    fn nested_fence_inside_markdown_block_stays_protected() {
        let lines = doc(&[
            "```markdown",
            "# Title",
            "```python",
            "**File:** a.md",
            "**Model:** x",
            "```",
            "```",
        ]);
        let out = process_lines(&lines).unwrap();
        // outer block widened, inner python fence content untouched
        assert_eq!(out[0], "````markdown\n");
        assert_eq!(out[3], "**File:** a.md\n");
        assert_eq!(out[4], "**Model:** x\n");
        assert_eq!(out[6], "````\n");
    }

    #[test]
    fn inner_fence_error_propagates() {
        let err = process_lines(&doc(&["```python", "    ```", "    ```", "```"])).unwrap_err();
        assert!(matches!(err, MendError::InnerFence { .. }));
    }

    #[test]
    fn pipeline_is_idempotent_on_mixed_document() {
        let lines = doc(&[
            "## Using __init__.py",
            "Steps to follow:",
            "1. Parent:",
            "   a. Child 1",
            "   b. Child 2",
            "",
            "**File:** a.md",
            "**Model:** Sonnet",
            "⚠️ careful here",
            "⚠️ and here",
            "",
            "Text about ```markdown blocks",
            "```python",
            "x = 1",
            "```",
            "---",
            "key: value",
            "---",
        ]);
        let once = process_lines(&lines).unwrap();
        let twice = process_lines(&once).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn empty_document_stays_empty() {
        assert_eq!(process_lines(&[]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn apply_fix_skips_protected_segments() {
        let lines = doc(&["before", "```python", "**A:** x", "**B:** y", "```"]);
        let out = apply_fix_to_segments(&lines, crate::lists::listify_metadata_blocks);
        assert_eq!(out, lines);
    }
}
