//! Asynchronous query status

use std::fmt;

/// Status of a filter query
///
/// Ordered by progress; a session never moves to a lower rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Not reported, or a status string this client does not know
    Unknown,
    Created,
    Scheduled,
    Processing,
    /// Paused by the service; partial results may be available
    Suspended,
    PartialResultReady,
    /// Results are available (wire: `ResultReady`)
    Complete,
    Failed,
    /// The query matched more records than the service will return
    TooManyRecords,
}

impl QueryStatus {
    /// Parse a wire status; unrecognized values map to `Unknown`
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            "Created" => QueryStatus::Created,
            "Scheduled" => QueryStatus::Scheduled,
            "Processing" => QueryStatus::Processing,
            "Suspended" => QueryStatus::Suspended,
            "PartialResultReady" => QueryStatus::PartialResultReady,
            "ResultReady" | "Complete" => QueryStatus::Complete,
            "Failed" => QueryStatus::Failed,
            "TooManyRecords" => QueryStatus::TooManyRecords,
            _ => QueryStatus::Unknown,
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Unknown => "Unknown",
            QueryStatus::Created => "Created",
            QueryStatus::Scheduled => "Scheduled",
            QueryStatus::Processing => "Processing",
            QueryStatus::Suspended => "Suspended",
            QueryStatus::PartialResultReady => "PartialResultReady",
            QueryStatus::Complete => "ResultReady",
            QueryStatus::Failed => "Failed",
            QueryStatus::TooManyRecords => "TooManyRecords",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueryStatus::Complete | QueryStatus::Failed | QueryStatus::TooManyRecords
        )
    }

    /// Terminal without results
    pub fn is_failure(&self) -> bool {
        matches!(self, QueryStatus::Failed | QueryStatus::TooManyRecords)
    }

    /// Partial results may be requested in this state
    pub fn allows_partial(&self) -> bool {
        matches!(
            self,
            QueryStatus::Suspended | QueryStatus::PartialResultReady | QueryStatus::Complete
        )
    }

    fn rank(&self) -> u8 {
        match self {
            QueryStatus::Unknown => 0,
            QueryStatus::Created => 1,
            QueryStatus::Scheduled => 2,
            QueryStatus::Processing => 3,
            QueryStatus::Suspended => 4,
            QueryStatus::PartialResultReady => 5,
            QueryStatus::Complete | QueryStatus::Failed | QueryStatus::TooManyRecords => 6,
        }
    }

    /// Status after observing `observed` while in `self`
    ///
    /// `Unknown`, regressions, and anything after a terminal state are
    /// ignored.
    pub fn advance(self, observed: QueryStatus) -> QueryStatus {
        if self.is_terminal() || observed == QueryStatus::Unknown {
            return self;
        }
        if observed.rank() >= self.rank() {
            observed
        } else {
            self
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
