//! JSON Lines file writer for confirmed-action records.
//!
//! Uses JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object
//! - Partial file corruption only affects individual lines
//! - Can be read even if write was interrupted

use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use tracing::{info, warn};

use crate::error::PersistenceResult;
use crate::log::ActionLogRecord;

/// Active writer state for the current daily file.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// JSON Lines writer for action records.
///
/// Uses append mode - safe for interrupted writes.
/// Each line is independent, so partial corruption only affects that line.
pub struct JsonLinesWriter {
    /// Base directory for output files.
    base_dir: String,
    /// Buffer of pending records.
    buffer: Vec<ActionLogRecord>,
    /// Maximum buffer size before flush.
    max_buffer_size: usize,
    /// Active writer (open until date rotation).
    active_writer: Option<ActiveWriter>,
}

impl JsonLinesWriter {
    /// Create a new JSON Lines writer.
    pub fn new(base_dir: &str, max_buffer_size: usize) -> Self {
        if let Err(e) = std::fs::create_dir_all(base_dir) {
            warn!(?e, "Failed to create directory: {}", base_dir);
        }

        Self {
            base_dir: base_dir.to_string(),
            buffer: Vec::with_capacity(max_buffer_size),
            max_buffer_size,
            active_writer: None,
        }
    }

    /// Add a record to the buffer, flushing when full.
    pub fn add_record(&mut self, record: ActionLogRecord) -> PersistenceResult<()> {
        self.buffer.push(record);

        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Close the active writer.
    fn close_active_writer(&mut self) {
        if let Some(mut active) = self.active_writer.take() {
            if let Err(e) = active.writer.flush() {
                warn!(?e, "Failed to flush writer on close");
            }
            info!(
                date = %active.date,
                records = active.records_written,
                "Closed action log file"
            );
        }
    }

    /// Create a new writer for the given date.
    fn create_new_writer(&mut self, date: &str) -> PersistenceResult<()> {
        let filename = format!("{}/actions_{}.jsonl", self.base_dir, date);

        info!(filename = %filename, "Opening action log file (append mode)");

        // Append mode - never truncates existing data.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&filename)?;

        self.active_writer = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });

        Ok(())
    }

    /// Flush buffered records to the current daily file.
    pub fn flush(&mut self) -> PersistenceResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();

        let needs_rotation = self
            .active_writer
            .as_ref()
            .map(|w| w.date != today)
            .unwrap_or(false);

        if needs_rotation {
            self.close_active_writer();
        }

        if self.active_writer.is_none() {
            self.create_new_writer(&today)?;
        }

        let record_count = self.buffer.len();
        let active = self
            .active_writer
            .as_mut()
            .expect("active_writer should exist");

        for record in self.buffer.drain(..) {
            let line = serde_json::to_string(&record)?;
            active.writer.write_all(line.as_bytes())?;
            active.writer.write_all(b"\n")?;
            active.records_written += 1;
        }
        active.writer.flush()?;

        info!(records = record_count, "Flushed action records");

        Ok(())
    }

    /// Records currently buffered and unflushed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl Drop for JsonLinesWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, "Flush on drop failed");
        }
        self.close_active_writer();
    }
}
