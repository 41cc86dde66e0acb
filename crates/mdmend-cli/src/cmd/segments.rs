use crate::output::{print_json, print_table};
use anyhow::Context;
use mdmend_core::{driver, segment};
use std::path::Path;

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let lines = driver::split_lines(&content);
    let segments = segment::parse_segments(&lines);

    if json {
        return print_json(&segments);
    }

    let rows: Vec<Vec<String>> = segments
        .iter()
        .map(|s| {
            vec![
                (s.start_line + 1).to_string(),
                if s.processable {
                    "processable"
                } else {
                    "protected"
                }
                .to_string(),
                s.language.clone().unwrap_or_else(|| "-".to_string()),
                s.lines.len().to_string(),
            ]
        })
        .collect();
    print_table(&["START", "KIND", "LANGUAGE", "LINES"], rows);
    Ok(())
}
