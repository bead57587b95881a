//! Size-sequenced log file description
//!
//! Files of one series share a prefix and a date and are told apart by a
//! sequence number: `app-20240305-00001.log`, `app-20240305-00002.log`, ...

use std::fmt;

use chrono::NaiveDate;

use super::{LogFileDescription, LOG_EXTENSION};
use crate::error::{Error, Result};

/// Identifies one file of a size-rotated series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SizeLimitedLogFile {
    prefix: String,
    date: NaiveDate,
    sequence: u64,
}

impl SizeLimitedLogFile {
    /// First sequence number of every series
    pub const FIRST_SEQUENCE: u64 = 1;

    /// Create a description for an explicit sequence number
    pub fn new(prefix: impl Into<String>, date: NaiveDate, sequence: u64) -> Self {
        Self {
            prefix: prefix.into(),
            date,
            sequence,
        }
    }

    /// Create the first description of the series for `date`
    pub fn first(prefix: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(prefix, date, Self::FIRST_SEQUENCE)
    }

    /// Get the file name prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the date the series belongs to
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Get the sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Get the successor, failing once the sequence cannot grow any further
    pub fn try_next(&self) -> Result<Self> {
        let sequence = self.sequence.checked_add(1).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Sequence of {} cannot advance past {}",
                self.prefix,
                u64::MAX
            ))
        })?;

        Ok(Self::new(self.prefix.clone(), self.date, sequence))
    }

    /// Recover a description from a file name produced by [`file_name`]
    ///
    /// Returns `None` for files of another prefix or an unrelated layout.
    ///
    /// [`file_name`]: LogFileDescription::file_name
    pub fn parse(prefix: &str, file_name: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(prefix)?.strip_prefix('-')?;
        let stem = rest.strip_suffix(LOG_EXTENSION)?.strip_suffix('.')?;
        let (date_part, sequence_part) = stem.split_once('-')?;

        if date_part.len() != 8 || sequence_part.is_empty() {
            return None;
        }
        if !sequence_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
        let sequence = sequence_part.parse::<u64>().ok()?;

        Some(Self::new(prefix, date, sequence))
    }
}

impl LogFileDescription for SizeLimitedLogFile {
    fn file_name(&self) -> String {
        format!(
            "{}-{}-{:05}.{}",
            self.prefix,
            self.date.format("%Y%m%d"),
            self.sequence,
            LOG_EXTENSION
        )
    }

    /// Saturates at `u64::MAX`; use [`try_next`](Self::try_next) to detect it
    fn next(&self) -> Self {
        self.try_next().unwrap_or_else(|_| self.clone())
    }
}

impl fmt::Display for SizeLimitedLogFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}
