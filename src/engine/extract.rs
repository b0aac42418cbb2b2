//! Line-oriented recognizer for the data block in a model reply.
//!
//! Model output is free text; somewhere inside it we expect the fixed-section
//! block the formatter taught the model to emit (`PROJECT CORE` /
//! `TARGET AUDIENCE` / `FEATURES`). Parsing is best-effort tolerant: malformed
//! lines are dropped silently, and a reply with no block at all yields an
//! empty fragment.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{CoreEntry, CoreField, FeatureItem, ParsedFragment};

/// Markers that locate the start of a data block, matched case-insensitively.
const SECTION_MARKERS: [&str; 4] = ["project core", "target audience", "features", "requirements:"];

/// Cleaned lines at or below this length are discarded as noise.
const NOISE_MAX_LEN: usize = 5;

/// Leading numeric list markers like `1. ` or `3) `.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("valid list marker pattern"));

/// Which section of the data block the cursor is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ProjectCore,
    TargetAudience,
    Features,
}

/// Parse the data block out of a model reply.
///
/// Scans for the earliest section marker, then walks the remaining lines
/// top-to-bottom with a section cursor. Header detection is substring-based
/// and a later header always overrides an earlier one for subsequent lines;
/// a content line that happens to contain a header phrase re-flips the cursor.
/// That ambiguity is long-observed behavior and is kept as-is.
pub fn extract_fragment(reply: &str) -> ParsedFragment {
    let lines: Vec<&str> = reply.lines().collect();

    let Some(start) = lines.iter().position(|line| {
        let lower = line.to_lowercase();
        SECTION_MARKERS.iter().any(|marker| lower.contains(marker))
    }) else {
        // No structured content in this reply.
        return ParsedFragment::default();
    };

    let mut fragment = ParsedFragment::default();
    let mut section: Option<Section> = None;

    for line in &lines[start..] {
        if line.trim().is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        // Guards against the model echoing the prompt's own framing back.
        if lower.contains("current requirements") {
            continue;
        }

        if lower.contains("project core") {
            section = Some(Section::ProjectCore);
            continue;
        }
        if lower.contains("target audience") {
            section = Some(Section::TargetAudience);
            continue;
        }
        if lower.contains("features") {
            section = Some(Section::Features);
            continue;
        }

        let Some(current) = section else {
            continue;
        };

        let cleaned = clean_line(line);
        if cleaned.len() <= NOISE_MAX_LEN {
            continue;
        }

        match current {
            Section::ProjectCore => {
                if let Some(entry) = parse_core_line(&cleaned) {
                    fragment.project_core.push(entry);
                }
            }
            Section::TargetAudience => {
                if let Some(value) = parse_audience_line(&cleaned) {
                    if !fragment.target_audience.iter().any(|a| a == value) {
                        fragment.target_audience.push(value.to_string());
                    }
                }
            }
            Section::Features => {
                if !fragment.features.iter().any(|f| f.text == cleaned) {
                    fragment.features.push(FeatureItem::new(cleaned));
                }
            }
        }
    }

    fragment
}

/// Strip the bullet, numeric list markers, and markdown decoration from a line.
fn clean_line(line: &str) -> String {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix("- ").unwrap_or(trimmed);
    let trimmed = LIST_MARKER.replace(trimmed, "");
    trimmed
        .trim_start_matches(['*', '`'])
        .trim()
        .to_string()
}

/// Recognize `<Key>: <value>` with a canonical key, case-insensitive.
///
/// Values of length one or less are treated as placeholders and dropped, so
/// the merger never sees empty fields.
fn parse_core_line(line: &str) -> Option<CoreEntry> {
    let (key, value) = line.split_once(':')?;
    let key = CoreField::parse(key)?;
    let value = value.trim();
    if value.len() <= 1 {
        return None;
    }
    Some(CoreEntry {
        key,
        value: value.to_string(),
    })
}

/// Recognize `Audience: <value>`.
fn parse_audience_line(line: &str) -> Option<&str> {
    let (key, value) = line.split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("audience") {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
