//! Folds a parsed fragment into a requirements snapshot.

use crate::models::{ParsedFragment, RequirementsSnapshot};

/// Merge newly extracted data into an existing snapshot, returning a new one.
///
/// - project-core entries replace in place on key match (position preserved),
///   otherwise append;
/// - audience strings append only if unseen, existing order untouched;
/// - features append only if their text is unseen; existing features and
///   their `checked` state are never altered or removed.
///
/// The input snapshot is not mutated; applying the same fragment twice yields
/// the same result as applying it once.
pub fn merge(existing: &RequirementsSnapshot, fragment: &ParsedFragment) -> RequirementsSnapshot {
    let mut merged = existing.clone();

    for entry in &fragment.project_core {
        match merged.project_core.iter_mut().find(|e| e.key == entry.key) {
            Some(slot) => slot.value = entry.value.clone(),
            None => merged.project_core.push(entry.clone()),
        }
    }

    for audience in &fragment.target_audience {
        if !merged.target_audience.iter().any(|a| a == audience) {
            merged.target_audience.push(audience.clone());
        }
    }

    for feature in &fragment.features {
        if !merged.features.iter().any(|f| f.text == feature.text) {
            merged.features.push(feature.clone());
        }
    }

    merged
}
