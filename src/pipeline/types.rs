use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::quality::Verdict;

/// One row as handed over by a row source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(default, rename = "content")]
    pub raw_content: Option<String>,
}

impl Record {
    pub fn new(id: i64, raw_content: Option<impl Into<String>>) -> Self {
        Self {
            id,
            raw_content: raw_content.map(Into::into),
        }
    }
}

/// A kept record, one JSON line in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputObject {
    pub id: i64,
    pub content: String,
}

/// Per-run tallies. Counts from parallel workers combine by addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub kept: u64,
    pub rejected_low_quality: u64,
    pub rejected_low_chinese_ratio: u64,
}

impl FilterCounts {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Keep => self.kept += 1,
            Verdict::RejectLowQuality => self.rejected_low_quality += 1,
            Verdict::RejectLowChineseRatio => self.rejected_low_chinese_ratio += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_low_quality + self.rejected_low_chinese_ratio
    }

    pub fn total(&self) -> u64 {
        self.kept + self.rejected()
    }
}

impl Add for FilterCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            kept: self.kept + rhs.kept,
            rejected_low_quality: self.rejected_low_quality + rhs.rejected_low_quality,
            rejected_low_chinese_ratio: self.rejected_low_chinese_ratio
                + rhs.rejected_low_chinese_ratio,
        }
    }
}

impl AddAssign for FilterCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for FilterCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Result of pushing one batch through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub kept: Vec<OutputObject>,
    pub counts: FilterCounts,
}

impl ProcessOutput {
    /// Append `other` after `self`, keeping input order.
    pub fn merge(mut self, other: Self) -> Self {
        self.kept.extend(other.kept);
        self.counts += other.counts;
        self
    }
}
