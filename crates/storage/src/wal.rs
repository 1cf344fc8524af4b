// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only, seq-numbered JSON-lines log of [`StorageOp`]s.
//!
//! Entries are kept in memory once loaded; `flush` is the only thing that
//! touches disk on the hot path. A line that fails to parse marks the end of
//! the valid prefix — everything from there on is rotated into a `.bak` file
//! so a half-written line from a crash never blocks recovery.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::op::StorageOp;

/// Number of buffered, unflushed appends before [`Wal::needs_flush`] returns true.
pub const FLUSH_THRESHOLD: usize = 100;

const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("wal io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wal serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub op: StorageOp,
}

pub struct Wal {
    path: PathBuf,
    file: File,
    entries: Vec<WalEntry>,
    read_cursor: usize,
    processed_seq: u64,
    write_seq: u64,
    pending: String,
    pending_lines: usize,
}

impl Wal {
    /// Open (creating if needed) the WAL at `path`, recovering from any
    /// truncated/corrupt tail, and position the read cursor just past
    /// `processed_seq` (the seq a loaded snapshot already covers).
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load_or_recover(&path)?;
        let write_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        let read_cursor = entries.partition_point(|e| e.seq <= processed_seq);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Wal {
            path,
            file,
            entries,
            read_cursor,
            processed_seq,
            write_seq,
            pending: String::new(),
            pending_lines: 0,
        })
    }

    fn load_or_recover(path: &Path) -> Result<Vec<WalEntry>, WalError> {
        if !path.exists() {
            File::create(path)?;
            return Ok(Vec::new());
        }
        let raw = fs::read(path)?;
        let text = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(_) => {
                Self::rotate_corrupt(path)?;
                File::create(path)?;
                return Ok(Vec::new());
            }
        };

        let mut valid = Vec::new();
        let mut consumed_bytes = 0usize;
        for line in text.lines() {
            match serde_json::from_str::<WalEntry>(line) {
                Ok(entry) => {
                    valid.push(entry);
                    consumed_bytes += line.len() + 1;
                }
                Err(_) => break,
            }
        }

        if consumed_bytes < text.len() {
            Self::rotate_corrupt(path)?;
            let mut rewritten = File::create(path)?;
            for entry in &valid {
                writeln!(rewritten, "{}", serde_json::to_string(entry)?)?;
            }
        }
        Ok(valid)
    }

    /// Rotate `path` into `.bak`, shifting older backups to `.bak.2`, `.bak.3`
    /// and dropping anything past [`MAX_BAK_FILES`].
    fn rotate_corrupt(path: &Path) -> Result<(), WalError> {
        let bak_path = |n: u32| {
            if n == 1 {
                path.with_extension("bak")
            } else {
                path.with_extension(format!("bak.{n}"))
            }
        };

        let oldest = bak_path(MAX_BAK_FILES);
        if oldest.exists() {
            let _ = fs::remove_file(&oldest);
        }
        for n in (1..MAX_BAK_FILES).rev() {
            let src = bak_path(n);
            if src.exists() {
                let _ = fs::rename(&src, bak_path(n + 1));
            }
        }
        fs::copy(path, bak_path(1))?;
        Ok(())
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    pub fn append(&mut self, op: &StorageOp) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, op: op.clone() };
        self.pending.push_str(&serde_json::to_string(&entry)?);
        self.pending.push('\n');
        self.pending_lines += 1;
        self.entries.push(entry);
        Ok(self.write_seq)
    }

    pub fn needs_flush(&self) -> bool {
        self.pending_lines >= FLUSH_THRESHOLD
    }

    /// Write buffered appends to disk and fsync. An entry is only durable —
    /// and only survives power loss — once this returns; `write_all` alone
    /// leaves it in the OS page cache.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.file.write_all(self.pending.as_bytes())?;
        self.file.sync_all()?;
        self.pending.clear();
        self.pending_lines = 0;
        Ok(())
    }

    /// Return the next entry past the read cursor, advancing it. Does not
    /// consult [`Wal::processed_seq`] — callers drive that via [`Wal::mark_processed`].
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let Some(entry) = self.entries.get(self.read_cursor) else {
            return Ok(None);
        };
        self.read_cursor += 1;
        Ok(Some(entry.clone()))
    }

    pub fn mark_processed(&mut self, seq: u64) {
        if seq > self.processed_seq {
            self.processed_seq = seq;
        }
    }

    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let start = self.entries.partition_point(|e| e.seq <= seq);
        Ok(self.entries[start..].to_vec())
    }

    /// Drop entries with `seq < seq` and rewrite the file, e.g. right after a
    /// snapshot makes them redundant for recovery.
    pub fn truncate_before(&mut self, seq: u64) -> Result<(), WalError> {
        self.entries.retain(|e| e.seq >= seq);
        self.read_cursor = self.entries.partition_point(|e| e.seq <= self.processed_seq);

        let mut rewritten = File::create(&self.path)?;
        for entry in &self.entries {
            writeln!(rewritten, "{}", serde_json::to_string(entry)?)?;
        }
        rewritten.sync_all()?;
        self.pending.clear();
        self.pending_lines = 0;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
