use std::io::Write;

use color_eyre::{Result, eyre::eyre};
use delve_core::{
    ItemKind, OutcomeKind, ScanMessage, ScanParameters, ScanSummary, Session, format_count,
    format_size,
};
use tracing::info;

use crate::ui::kind_icon;

/// Run one scan to completion, writing each match to `out` as it arrives
pub fn run_list<W: Write>(params: ScanParameters, json: bool, out: &mut W) -> Result<ScanSummary> {
    let mut session = Session::new();
    let handle = session.start_scan(params)?;

    for msg in handle.receiver().iter() {
        match msg {
            ScanMessage::ItemFound(item) => {
                if json {
                    serde_json::to_writer(&mut *out, &item)?;
                    writeln!(out)?;
                } else if item.kind == ItemKind::File {
                    writeln!(
                        out,
                        "{} {}  {}",
                        kind_icon(item.kind),
                        item.path.display(),
                        format_size(item.size)
                    )?;
                } else {
                    writeln!(out, "{} {}", kind_icon(item.kind), item.path.display())?;
                }
            }
            ScanMessage::Completed | ScanMessage::Cancelled => break,
            ScanMessage::Progress(_) => {}
        }
    }
    out.flush()?;

    let summary = handle
        .join(delve_core::STOP_GRACE)
        .ok_or_else(|| eyre!("scan worker did not finish"))?;
    info!(
        found = summary.progress.items_found(),
        visited = summary.progress.items_visited,
        "list finished"
    );
    Ok(summary)
}

/// One-line human summary of a finished scan
pub fn summary_line(summary: &ScanSummary) -> String {
    let progress = &summary.progress;
    let status = match summary.kind {
        OutcomeKind::Completed => "done",
        OutcomeKind::Cancelled => "stopped",
        OutcomeKind::CompletedWithErrors => "done with errors",
    };
    format!(
        "{}: {} files ({}), {} folders, {} symlinks; {} visited, {} errors in {:.1}s",
        status,
        format_count(progress.files_found),
        format_size(progress.file_bytes),
        format_count(progress.dirs_found),
        format_count(progress.symlinks_found),
        format_count(progress.items_visited),
        format_count(progress.errors),
        progress.elapsed.as_secs_f64(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("logs")).unwrap();
        fs::write(temp.path().join("logs/app.log"), "error: disk full").unwrap();
        fs::write(temp.path().join("notes.txt"), "nothing here").unwrap();
        temp
    }

    #[test]
    fn test_text_listing() {
        let temp = tree();
        let mut params = ScanParameters::new(temp.path());
        params.search_words = vec!["error".to_string()];
        params.include_folders = false;

        let mut out = Vec::new();
        let summary = run_list(params, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(summary.kind, OutcomeKind::Completed);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("app.log"));
        assert!(text.trim_end().ends_with("16 B"));
        assert!(summary_line(&summary).starts_with("done: 1 files"));
    }

    #[test]
    fn test_json_listing() {
        let temp = tree();
        let params = ScanParameters::new(temp.path());

        let mut out = Vec::new();
        run_list(params, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let items: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["kind"], "Directory");
        assert!(items[0]["path"].as_str().unwrap().ends_with("logs"));
    }

    #[test]
    fn test_invalid_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let params = ScanParameters::new(temp.path().join("missing"));
        assert!(run_list(params, false, &mut Vec::new()).is_err());
    }
}
