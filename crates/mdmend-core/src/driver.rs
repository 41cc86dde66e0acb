//! File driver: read a file, run the pipeline, write back only on change.

use crate::error::Result;
use crate::io::atomic_write;
use crate::pipeline::process_lines;
use std::path::Path;

/// Split file content into lines, each keeping its trailing terminator.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

/// Reformat `path` in place. Returns whether the file was rewritten; the
/// file is untouched when the pipeline is a no-op.
pub fn process_file(path: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(path)?;
    let fixed = render(&content)?;
    if fixed == content {
        return Ok(false);
    }
    atomic_write(path, fixed.as_bytes())?;
    Ok(true)
}

/// Like [`process_file`] but never writes. Returns whether the file would
/// change.
pub fn check_file(path: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(path)?;
    Ok(render(&content)? != content)
}

fn render(content: &str) -> Result<String> {
    let lines = split_lines(content);
    Ok(process_lines(&lines)?.concat())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MendError;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn clean_file_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.md", "# Clean heading\n\nBody text.\n");
        assert!(!process_file(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Clean heading\n\nBody text.\n"
        );
    }

    #[test]
    fn dirty_file_is_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.md", "## About __init__.py\n");
        assert!(process_file(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "## About `__init__.py`\n"
        );
    }

    #[test]
    fn check_reports_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.md", "## About __init__.py\n");
        assert!(check_file(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "## About __init__.py\n"
        );
    }

    #[test]
    fn empty_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.md", "");
        assert!(!process_file(&path).unwrap());
    }

    #[test]
    fn file_without_final_newline_survives() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.md", "plain text");
        assert!(!process_file(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "plain text");
    }

    #[test]
    fn inner_fence_error_leaves_file_untouched() {
        let content = "```python\n    ```\n    ```\n```\n";
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.md", content);
        let err = process_file(&path).unwrap_err();
        assert!(matches!(err, MendError::InnerFence { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = process_file(&dir.path().join("absent.md")).unwrap_err();
        assert!(matches!(err, MendError::Io(_)));
    }
}
