use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The six canonical project-core fields the wizard collects.
///
/// Keys are matched case-insensitively on input, but the canonical spelling
/// is enforced everywhere the field is stored or rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoreField {
    Name,
    Purpose,
    Region,
    Platform,
    Email,
    Budget,
}

impl CoreField {
    pub const ALL: [CoreField; 6] = [
        Self::Name,
        Self::Purpose,
        Self::Region,
        Self::Platform,
        Self::Email,
        Self::Budget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Purpose => "Purpose",
            Self::Region => "Region",
            Self::Platform => "Platform",
            Self::Email => "Email",
            Self::Budget => "Budget",
        }
    }

    /// Parse a field name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| s.eq_ignore_ascii_case(field.as_str()))
    }
}

/// One collected project-core value, e.g. `Platform: mobile app (iOS)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreEntry {
    pub key: CoreField,
    pub value: String,
}

/// A suggested feature the user can keep or discard.
///
/// `checked` defaults to true at creation and is the only field a downstream
/// consumer may flip afterwards. Feature texts are unique within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureItem {
    pub id: Uuid,
    pub text: String,
    pub checked: bool,
}

impl FeatureItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            checked: true,
        }
    }
}

/// The full structured requirements state for one session.
///
/// Created empty at session start, read before every model call, and replaced
/// by the merge of itself with newly parsed content after every reply.
///
/// Invariants upheld by the merger:
/// - at most one `project_core` entry per [`CoreField`], last-write-wins in
///   place;
/// - `target_audience` deduplicated by exact match, insertion order preserved;
/// - `features` deduplicated by exact text match, existing entries (and their
///   `checked` state) never altered by a merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequirementsSnapshot {
    pub project_core: Vec<CoreEntry>,
    pub target_audience: Vec<String>,
    pub features: Vec<FeatureItem>,
}

impl RequirementsSnapshot {
    pub fn core_value(&self, field: CoreField) -> Option<&str> {
        self.project_core
            .iter()
            .find(|entry| entry.key == field)
            .map(|entry| entry.value.as_str())
    }

    pub fn has(&self, field: CoreField) -> bool {
        self.core_value(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.project_core.is_empty() && self.target_audience.is_empty() && self.features.is_empty()
    }

    /// Final deliverable of a session: the collected fields and audience, plus
    /// only the features the user left checked.
    pub fn summary(&self) -> FinalSummary {
        FinalSummary {
            core: self.project_core.clone(),
            audience: self.target_audience.clone(),
            features: self
                .features
                .iter()
                .filter(|feature| feature.checked)
                .map(|feature| feature.text.clone())
                .collect(),
        }
    }
}

/// Finalized requirements handed to whatever consumes the wizard's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalSummary {
    pub core: Vec<CoreEntry>,
    pub audience: Vec<String>,
    pub features: Vec<String>,
}
