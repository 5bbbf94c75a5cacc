use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// The six status codes a job can report.
///
/// Each job normally flows: INCOMPLETE → READY/DOWNLOADING → PROCESSING →
/// COMPLETED, with FAILED as the other terminal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatusCode {
    Incomplete,
    Ready,
    Downloading,
    Processing,
    Failed,
    Completed,
}

impl JobStatusCode {
    pub const ALL: [JobStatusCode; 6] = [
        JobStatusCode::Incomplete,
        JobStatusCode::Ready,
        JobStatusCode::Downloading,
        JobStatusCode::Processing,
        JobStatusCode::Failed,
        JobStatusCode::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatusCode::Incomplete => "incomplete",
            JobStatusCode::Ready => "ready",
            JobStatusCode::Downloading => "downloading",
            JobStatusCode::Processing => "processing",
            JobStatusCode::Failed => "failed",
            JobStatusCode::Completed => "completed",
        }
    }

    /// Position of the code in the status ranking.
    ///
    /// `ready` and `downloading` share a rank, so either can follow the other.
    /// `failed` sits between `processing` and `completed`.
    pub fn rank(&self) -> u8 {
        match self {
            JobStatusCode::Incomplete => 1,
            JobStatusCode::Ready | JobStatusCode::Downloading => 2,
            JobStatusCode::Processing => 3,
            JobStatusCode::Failed => 4,
            JobStatusCode::Completed => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatusCode::Failed | JobStatusCode::Completed)
    }
}

impl fmt::Display for JobStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatusCode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatusCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ConvertError::UnknownStatus(s.to_string()))
    }
}

/// A validated job status together with its rank.
///
/// Instances only come from a known [`JobStatusCode`], so the rank is always
/// consistent with the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStatus {
    code: JobStatusCode,
    rank: u8,
}

impl JobStatus {
    /// Parse a status as reported by the service.
    pub fn new(code: &str) -> Result<Self, ConvertError> {
        code.parse::<JobStatusCode>().map(Self::from)
    }

    pub fn code(&self) -> JobStatusCode {
        self.code
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn is_status(&self, code: JobStatusCode) -> bool {
        self.code == code
    }

    /// True when `candidate` is at the same or a higher rank than `self`.
    pub fn can_be_updated(&self, candidate: &JobStatus) -> bool {
        candidate.rank >= self.rank
    }
}

impl From<JobStatusCode> for JobStatus {
    fn from(code: JobStatusCode) -> Self {
        Self {
            code,
            rank: code.rank(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
