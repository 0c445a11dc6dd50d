//! Job kinds and the unit of scheduled work.

use serde_json::Value;

use crate::codec::RequestId;

/// The fixed set of request types the host accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Merge configuration and rebuild affected pipelines.
    Initialize,
    /// Score the primary and requested related-keyword dimensions.
    Analyze,
    /// Same as `Analyze`, labelled separately for diagnostics.
    AnalyzeRelatedKeywords,
    /// Load an external bundle by URL.
    LoadScript,
    /// Run one named research.
    RunResearch,
    /// Route data to a registered message handler.
    CustomMessage,
}

impl JobKind {
    /// Every job kind, in routing-table order.
    pub const ALL: [Self; 6] = [
        Self::Initialize,
        Self::Analyze,
        Self::AnalyzeRelatedKeywords,
        Self::LoadScript,
        Self::RunResearch,
        Self::CustomMessage,
    ];

    /// Resolves a wire type name. Names are case-sensitive.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Wire name of the job type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Analyze => "analyze",
            Self::AnalyzeRelatedKeywords => "analyzeRelatedKeywords",
            Self::LoadScript => "loadScript",
            Self::RunResearch => "runResearch",
            Self::CustomMessage => "customMessage",
        }
    }

    /// Whether a pending run of this kind collapses to its latest job.
    ///
    /// Only analyses coalesce; every other kind has side effects or a caller
    /// waiting on its specific result.
    #[must_use]
    pub const fn coalesces(self) -> bool {
        matches!(self, Self::Analyze | Self::AnalyzeRelatedKeywords)
    }

    /// Diagnostic label prefixed to failure messages.
    #[must_use]
    pub fn failure_label(self, data: &Value) -> String {
        match self {
            Self::Analyze => "An error occurred while running the analysis.".to_owned(),
            Self::AnalyzeRelatedKeywords => {
                "An error occurred while running the related keywords analysis.".to_owned()
            }
            Self::RunResearch => {
                let name = data.get("name").and_then(Value::as_str).unwrap_or_default();
                format!("An error occurred after running the '{name}' research.")
            }
            Self::Initialize | Self::LoadScript | Self::CustomMessage => {
                format!("An error occurred while handling '{}'.", self.as_str())
            }
        }
    }
}

/// One scheduled request.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Correlation identifier of the originating request.
    pub id: RequestId,
    /// Job type.
    pub kind: JobKind,
    /// Request payload; `null` when the request carried none.
    pub data: Value,
}

impl Job {
    /// Creates a job.
    pub fn new(id: RequestId, kind: JobKind, data: Value) -> Self {
        Self { id, kind, data }
    }

    /// Label used when this job fails.
    #[must_use]
    pub fn failure_label(&self) -> String {
        self.kind.failure_label(&self.data)
    }
}
