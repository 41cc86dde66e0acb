use crate::output::print_json;
use mdmend_core::driver;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
enum FileStatus {
    Fixed,
    WouldFix,
    Unchanged,
    Failed,
}

#[derive(Serialize)]
struct FileReport {
    path: String,
    status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Sequential batch loop. A file that fails (the inner-fence error, or an
/// I/O error) is reported and does not stop the rest of the batch.
pub fn run(files: &[PathBuf], check: bool, json: bool) -> anyhow::Result<()> {
    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        tracing::debug!(path = %path.display(), check, "processing");
        let result = if check {
            driver::check_file(path)
        } else {
            driver::process_file(path)
        };
        let (status, message) = match result {
            Ok(true) if check => (FileStatus::WouldFix, None),
            Ok(true) => (FileStatus::Fixed, None),
            Ok(false) => (FileStatus::Unchanged, None),
            Err(e) => (FileStatus::Failed, Some(e.to_string())),
        };
        reports.push(FileReport {
            path: path.display().to_string(),
            status,
            message,
        });
    }

    let changed = reports
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Fixed | FileStatus::WouldFix))
        .count();
    let failed = reports
        .iter()
        .filter(|r| r.status == FileStatus::Failed)
        .count();

    if json {
        #[derive(Serialize)]
        struct BatchReport<'a> {
            files: &'a [FileReport],
            changed: usize,
            failed: usize,
        }
        print_json(&BatchReport {
            files: &reports,
            changed,
            failed,
        })?;
    } else {
        for r in &reports {
            match r.status {
                FileStatus::Fixed => println!("fixed      {}", r.path),
                FileStatus::WouldFix => println!("would fix  {}", r.path),
                FileStatus::Unchanged => println!("unchanged  {}", r.path),
                FileStatus::Failed => println!(
                    "error      {}: {}",
                    r.path,
                    r.message.as_deref().unwrap_or("unknown error")
                ),
            }
        }
        println!();
        println!(
            "{} file(s) checked, {} changed, {} failed",
            reports.len(),
            changed,
            failed
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed");
    }
    if check && changed > 0 {
        anyhow::bail!("{changed} file(s) would be reformatted");
    }
    Ok(())
}
