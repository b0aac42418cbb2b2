use serde::{Deserialize, Serialize};

use super::{CoreEntry, FeatureItem};

/// Structured requirement data parsed out of a single model reply.
///
/// A fragment is transient: it exists between the extractor and the merger
/// and is never persisted. An empty fragment is the normal result for a reply
/// that carries no data block, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedFragment {
    pub project_core: Vec<CoreEntry>,
    pub target_audience: Vec<String>,
    pub features: Vec<FeatureItem>,
}

impl ParsedFragment {
    pub fn is_empty(&self) -> bool {
        self.project_core.is_empty() && self.target_audience.is_empty() && self.features.is_empty()
    }
}
