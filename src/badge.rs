//! Consumer side of a detection: the badge state and the capture hand-off
//!
//! The badge shows nothing for "no detection" and still shows for a
//! detection with no extracted fields; those two states never collapse.

use std::io::Write;

use serde::Serialize;

use crate::detector::DetectionResult;
use crate::error::Result;
use crate::job::JobData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Low,
}

/// What the notification badge should display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BadgeState {
    Hidden,
    Detected {
        portal: String,
        confidence: f64,
        level: ConfidenceLevel,
        /// False when the page was recognized but nothing could be extracted
        has_data: bool,
    },
}

impl BadgeState {
    pub fn from_result(result: Option<&DetectionResult>, high_threshold: f64) -> Self {
        match result {
            None => BadgeState::Hidden,
            Some(r) => BadgeState::Detected {
                portal: r.portal.clone(),
                confidence: r.confidence,
                level: if r.confidence >= high_threshold {
                    ConfidenceLevel::High
                } else {
                    ConfidenceLevel::Low
                },
                has_data: r.basic_data.as_ref().map(|d| has_captured_fields(d)).unwrap_or(false),
            },
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, BadgeState::Hidden)
    }
}

/// Anything beyond the source URL worth pre-filling
fn has_captured_fields(data: &JobData) -> bool {
    let without_url = JobData {
        job_url: None,
        ..data.clone()
    };
    !without_url.is_empty()
}

/// Record to pre-fill the capture form with; empty when nothing was extracted
pub fn capture(result: &DetectionResult) -> JobData {
    result.basic_data.clone().unwrap_or_default()
}

/// Destination for captured job records
pub trait JobSink {
    fn accept(&mut self, job: JobData) -> Result<()>;
}

impl JobSink for Vec<JobData> {
    fn accept(&mut self, job: JobData) -> Result<()> {
        self.push(job);
        Ok(())
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> JobSink for JsonLinesSink<W> {
    fn accept(&mut self, job: JobData) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &job)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
