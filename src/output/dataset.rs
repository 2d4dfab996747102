//! Append-only JSONL output log
//!
//! Records are buffered in memory and appended on flush, one JSON object per
//! line. A line cut short by a kill mid-write is terminated on the next open so
//! later appends never merge into it.

use crate::output::DatasetResult;
use crate::synth::TrainingRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Buffered writer over the dataset file
#[derive(Debug)]
pub struct OutputLog {
    path: PathBuf,
    pending: Vec<TrainingRecord>,
    written: u64,
}

impl OutputLog {
    /// Opens the log at `path`, creating parent directories as needed
    ///
    /// Existing lines are counted so resumed runs keep an accurate total.
    pub fn open(path: &Path) -> DatasetResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if repair_tail(path)? {
            tracing::warn!(
                "Terminated a partial line at the end of {}",
                path.display()
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            pending: Vec::new(),
            written: count_records(path)?,
        })
    }

    /// Path of the dataset file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Buffers records until the next flush
    pub fn extend(&mut self, records: impl IntoIterator<Item = TrainingRecord>) {
        self.pending.extend(records);
    }

    /// Records on disk plus records still buffered
    pub fn total(&self) -> u64 {
        self.written + self.pending.len() as u64
    }

    /// Appends buffered records and syncs the file; returns how many were written
    pub fn flush(&mut self) -> DatasetResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);

        for record in &self.pending {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        let count = self.pending.len();
        self.written += count as u64;
        self.pending.clear();
        Ok(count)
    }
}

/// Counts non-empty lines in the dataset; a missing file has none
pub fn count_records(path: &Path) -> DatasetResult<u64> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut count = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.iter().any(|b| !b.is_ascii_whitespace()) {
            count += 1;
        }
    }

    Ok(count)
}

/// Empties the dataset file, creating it if needed
pub fn truncate(path: &Path) -> DatasetResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)?;
    Ok(())
}

/// Appends a newline if the file does not end with one; returns true if it did
fn repair_tail(path: &Path) -> DatasetResult<bool> {
    let mut file = match OpenOptions::new().read(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    if file.metadata()?.len() == 0 {
        return Ok(false);
    }

    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;

    if last[0] == b'\n' {
        return Ok(false);
    }

    file.write_all(b"\n")?;
    file.sync_all()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_fields;
    use crate::synth::{synthesize, SynthesisSettings};
    use chrono::Utc;

    fn sample_records() -> Vec<TrainingRecord> {
        let text = "Warning: disconnect power before replacing the battery on this Dell laptop. Step 1: remove the back panel. Step 2: unscrew the battery with a screwdriver. Step 3: lift the battery out of the chassis.";
        let fields = extract_fields(text, Some("Dell battery"));
        synthesize(
            text,
            &fields,
            "https://www.dell.com/support/kbdoc/1",
            SynthesisSettings {
                min_text_length: 100,
                quality_threshold: 0.3,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = OutputLog::open(&dir.path().join("out").join("data.jsonl")).unwrap();
        assert_eq!(log.total(), 0);
    }

    #[test]
    fn test_flush_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        let records = sample_records();
        let expected = records.len();
        assert!(expected >= 2);

        let mut log = OutputLog::open(&path).unwrap();
        log.extend(records);
        assert_eq!(log.total(), expected as u64);
        assert_eq!(log.flush().unwrap(), expected);
        assert_eq!(log.flush().unwrap(), 0);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), expected);
        for line in content.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("question").is_some());
            assert!(value.get("response").is_some());
            assert!(value.get("metadata").is_some());
        }
    }

    #[test]
    fn test_reopen_counts_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");

        let mut log = OutputLog::open(&path).unwrap();
        log.extend(sample_records());
        let written = log.flush().unwrap();

        let reopened = OutputLog::open(&path).unwrap();
        assert_eq!(reopened.total(), written as u64);
    }

    #[test]
    fn test_partial_tail_is_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        fs::write(&path, "{\"question\":\"q\",\"response\":\"r\",\"metadata\":{}}\n{\"quest").unwrap();

        let mut log = OutputLog::open(&path).unwrap();
        assert_eq!(log.total(), 2);
        log.extend(sample_records());
        log.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "{\"quest");
        assert!(serde_json::from_str::<serde_json::Value>(lines[2]).is_ok());
    }

    #[test]
    fn test_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        fs::write(&path, "a\nb\n").unwrap();

        truncate(&path).unwrap();
        assert_eq!(count_records(&path).unwrap(), 0);
    }

    #[test]
    fn test_count_records_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        fs::write(&path, "a\n\n   \nb\n").unwrap();
        assert_eq!(count_records(&path).unwrap(), 2);
    }
}
