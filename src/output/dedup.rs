//! Final deduplication pass over the output log
//!
//! Two records are duplicates when the first [`DEDUP_KEY_CHARS`] characters
//! of their responses are identical. The first occurrence in file order wins.
//! Surviving lines are written back byte-for-byte.

use crate::output::DatasetResult;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Characters of the response used as the duplicate key
pub const DEDUP_KEY_CHARS: usize = 5000;

/// What the deduplication pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Records written back
    pub kept: usize,
    /// Duplicates and records with an empty response
    pub dropped: usize,
    /// Lines that were not a record object
    pub malformed: usize,
}

/// Deduplicates the log at `path` in place
///
/// The log is rewritten through a temporary file in the same directory and
/// renamed over the original, so an interrupted pass leaves the old log intact.
/// A missing log is treated as empty.
pub fn deduplicate(path: &Path) -> DatasetResult<DedupReport> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DedupReport::default()),
        Err(e) => return Err(e.into()),
    };

    let tmp_path = temporary_path(path);
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    let mut reader = BufReader::new(file);

    let mut report = DedupReport::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut line = Vec::new();
    let mut line_number = 0usize;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_number += 1;

        let content = trim_line_ending(&line);
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }

        let Some(response) = response_of(content) else {
            tracing::warn!("Skipping malformed line {} in {}", line_number, path.display());
            report.malformed += 1;
            continue;
        };

        if response.is_empty() {
            report.dropped += 1;
            continue;
        }

        let key: String = response.chars().take(DEDUP_KEY_CHARS).collect();
        if !seen.insert(key) {
            report.dropped += 1;
            continue;
        }

        writer.write_all(content)?;
        writer.write_all(b"\n")?;
        report.kept += 1;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    tracing::info!(
        "Deduplicated {}: kept {}, dropped {}, malformed {}",
        path.display(),
        report.kept,
        report.dropped,
        report.malformed
    );

    Ok(report)
}

/// Returns the record's response, or `None` if the line is not a record
fn response_of(line: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(line).ok()?;
    value
        .as_object()?
        .get("response")?
        .as_str()
        .map(str::to_string)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".dedup.tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(question: &str, response: &str) -> String {
        serde_json::json!({
            "question": question,
            "response": response,
            "metadata": {"source_url": "https://www.dell.com/support/kbdoc/1"}
        })
        .to_string()
    }

    fn write_log(lines: &[String]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let (_dir, path) = write_log(&[
            line("q1", "Replace the battery."),
            line("q2", "Reseat the RAM."),
            line("q3", "Replace the battery."),
        ]);

        let report = deduplicate(&path).unwrap();
        assert_eq!(
            report,
            DedupReport {
                kept: 2,
                dropped: 1,
                malformed: 0
            }
        );

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!(
                "{}\n{}\n",
                line("q1", "Replace the battery."),
                line("q2", "Reseat the RAM.")
            )
        );
    }

    #[test]
    fn test_key_is_response_prefix() {
        let shared = "a".repeat(DEDUP_KEY_CHARS);
        let (_dir, path) = write_log(&[
            line("q1", &format!("{}first tail", shared)),
            line("q2", &format!("{}second tail", shared)),
            line("q3", &"a".repeat(DEDUP_KEY_CHARS - 1)),
        ]);

        let report = deduplicate(&path).unwrap();
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped, 1);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("first tail"));
        assert!(!content.contains("second tail"));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let (_dir, path) = write_log(&[
            line("q1", "Update the BIOS."),
            "{\"question\":\"cut off".to_string(),
            "[1, 2, 3]".to_string(),
            "{\"question\":\"no response\"}".to_string(),
            line("q2", "Clear the CMOS."),
        ]);

        let report = deduplicate(&path).unwrap();
        assert_eq!(report.kept, 2);
        assert_eq!(report.malformed, 3);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_empty_responses_are_dropped() {
        let (_dir, path) = write_log(&[line("q1", ""), line("q2", "Check the fan.")]);

        let report = deduplicate(&path).unwrap();
        assert_eq!(report.kept, 1);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let report = deduplicate(&dir.path().join("absent.jsonl")).unwrap();
        assert_eq!(report, DedupReport::default());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let (_dir, path) = write_log(&[
            line("q1", "Replace the fan."),
            line("q2", "Replace the fan."),
            line("q3", "Replace the hinge."),
        ]);

        deduplicate(&path).unwrap();
        let once = fs::read_to_string(&path).unwrap();
        let report = deduplicate(&path).unwrap();

        assert_eq!(report.dropped, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), once);
        assert!(!temporary_path(&path).exists());
    }
}
