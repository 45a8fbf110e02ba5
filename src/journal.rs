/// Append-only reading journal, partitioned by UTC calendar date.
///
/// One JSON record per line in `readings_YYYYMMDD.jsonl`. Records are
/// independently parseable — a crash mid-write corrupts at most the last
/// line, never a prior one. The journal is written by exactly one
/// controller; there is no internal locking, but every record is flushed
/// and fsynced before `append` returns so a crash after success cannot
/// lose it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::model::Reading;

/// Date-partitioned JSONL sink for validated readings.
pub struct ReadingJournal {
    data_dir: PathBuf,
    // Open handle for the current partition, rolled over on date change.
    current: Option<(NaiveDate, File)>,
}

impl ReadingJournal {
    /// Open a journal rooted at `data_dir`, creating the directory if it
    /// does not exist.
    pub fn open(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            current: None,
        })
    }

    /// Directory holding the daily partition files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the partition file for a given UTC date.
    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("readings_{}.jsonl", date.format("%Y%m%d")))
    }

    /// Append one reading to its date partition.
    ///
    /// The record is durable when this returns `Ok`. Never rewrites or
    /// truncates existing data.
    pub fn append(&mut self, reading: &Reading) -> io::Result<()> {
        let date = reading.timestamp.date_naive();
        let file = self.partition_file(date)?;

        let mut line = serde_json::to_vec(reading).map_err(io::Error::other)?;
        line.push(b'\n');

        file.write_all(&line)?;
        file.flush()?;
        file.sync_data()
    }

    fn partition_file(&mut self, date: NaiveDate) -> io::Result<&mut File> {
        let current = match self.current.take() {
            Some((open_date, file)) if open_date == date => (open_date, file),
            _ => {
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(self.partition_path(date))?;
                (date, file)
            }
        };
        Ok(&mut self.current.insert(current).1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
