//! Hour-dated log file description
//!
//! Each day gets its own directory, each hour its own file inside it:
//! `2024-03-05/app-14.log`.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use super::{LogFileDescription, LOG_EXTENSION};
use crate::error::{Error, Result};

/// Identifies the file for one hour of one day
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HourlyLogFile {
    prefix: String,
    date: NaiveDate,
    hour: u32,
}

impl HourlyLogFile {
    /// Create a description for `hour` (0-23) of `date`
    pub fn new(prefix: impl Into<String>, date: NaiveDate, hour: u32) -> Result<Self> {
        if hour > 23 {
            return Err(Error::invalid_argument(format!(
                "Hour must be between 0 and 23, got {}",
                hour
            )));
        }

        Ok(Self {
            prefix: prefix.into(),
            date,
            hour,
        })
    }

    /// Create the description for the hour containing `time`
    pub fn for_time(prefix: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            prefix: prefix.into(),
            date: time.date(),
            hour: time.hour(),
        }
    }

    /// Get the file name prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the date
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Get the hour of the day
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Name of the per-day directory, derived from the date only
    pub fn directory_name(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Per-day directory under `root`
    pub fn directory(&self, root: &Path) -> PathBuf {
        root.join(self.directory_name())
    }

    /// Full path of the file under `root`
    pub fn path(&self, root: &Path) -> PathBuf {
        self.directory(root).join(self.file_name())
    }

    /// Returns `true` if `time` falls inside this hour
    pub fn covers(&self, time: NaiveDateTime) -> bool {
        time.date() == self.date && time.hour() == self.hour
    }
}

impl LogFileDescription for HourlyLogFile {
    fn file_name(&self) -> String {
        format!("{}-{:02}.{}", self.prefix, self.hour, LOG_EXTENSION)
    }

    /// The last hour of [`NaiveDate::MAX`] is its own successor
    fn next(&self) -> Self {
        let (date, hour) = if self.hour < 23 {
            (self.date, self.hour + 1)
        } else {
            match self.date.succ_opt() {
                Some(date) => (date, 0),
                None => return self.clone(),
            }
        };

        Self {
            prefix: self.prefix.clone(),
            date,
            hour,
        }
    }
}

impl fmt::Display for HourlyLogFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.directory_name(), self.file_name())
    }
}
