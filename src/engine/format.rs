//! Renders snapshot state into model-facing text.
//!
//! The requirements block must round-trip: whatever [`requirements_block`]
//! emits has to parse back through the extractor into the same data. The
//! section headers and line shapes here and in `extract.rs` move together.

use std::fmt::Write;

use crate::engine::policy::{feature_count_range, Step};
use crate::models::{CoreField, RequirementsSnapshot};

/// Serialize a snapshot into the fixed-layout data block.
///
/// `PROJECT CORE` is always present (a lone `-` when empty); the other two
/// sections are omitted entirely when they have no content.
pub fn requirements_block(snapshot: &RequirementsSnapshot) -> String {
    let mut block = String::from("PROJECT CORE\n");
    if snapshot.project_core.is_empty() {
        block.push_str("-\n");
    } else {
        for entry in &snapshot.project_core {
            let _ = writeln!(block, "- {}: {}", entry.key.as_str(), entry.value);
        }
    }

    if !snapshot.target_audience.is_empty() {
        block.push_str("\nTARGET AUDIENCE\n");
        for audience in &snapshot.target_audience {
            let _ = writeln!(block, "- Audience: {}", audience);
        }
    }

    if !snapshot.features.is_empty() {
        block.push_str("\nFEATURES\n");
        for feature in &snapshot.features {
            let _ = writeln!(block, "- {}", feature.text);
        }
    }

    block
}

/// Render the full system instruction for one wizard turn.
///
/// The persona and output-format rules are fixed; the question directive
/// varies with the selected step; the current requirements block is embedded
/// verbatim so the model sees its own prior state every turn.
pub fn instruction(
    step: Step,
    snapshot: &RequirementsSnapshot,
    first_user_message: Option<&str>,
) -> String {
    let mut text = String::from(
        "You are a friendly, methodical senior business analyst guiding a user \
         from a vague idea to a concrete set of initial app requirements.\n\n\
         Core rules for every reply:\n\
         1. Ask exactly ONE question. Your conversational text must end with a \
         single clear question.\n\
         2. After the conversational text, output the keyword `Requirements:` \
         followed by the complete, updated requirements block in exactly this \
         layout:\n\
         PROJECT CORE\n\
         - <Key>: <value>\n\
         TARGET AUDIENCE\n\
         - Audience: <value>\n\
         FEATURES\n\
         - <feature text>\n\
         Keys in PROJECT CORE are only: Name, Purpose, Region, Platform, \
         Email, Budget. Carry forward everything already known and add what \
         the user just told you.\n\n",
    );

    let _ = writeln!(
        text,
        "Current requirements:\n{}",
        requirements_block(snapshot)
    );

    text.push_str("This turn: ");
    match step {
        Step::AwaitName => {
            text.push_str("greet the user warmly and ask for their name.");
        }
        Step::AwaitPurpose => {
            text.push_str(
                "ask what the purpose of their app is. Offer two or three \
                 example directions",
            );
            if let Some(idea) = first_user_message {
                let _ = write!(
                    text,
                    " derived from their opening message: \"{}\"",
                    idea.trim()
                );
            }
            text.push('.');
        }
        Step::AwaitRegion => {
            text.push_str(
                "ask which region or market the app is aimed at (for example a \
                 country, a continent, or worldwide).",
            );
        }
        Step::AwaitPlatform => {
            text.push_str(
                "ask which platform they are targeting: web, mobile, or both.",
            );
        }
        Step::AwaitPlatformDetail => {
            text.push_str(
                "the platform mentions mobile without naming an OS. Ask whether \
                 they want iOS, Android, or both, and fold the answer into the \
                 existing Platform value.",
            );
        }
        Step::AwaitEmail => {
            text.push_str(
                "ask for an email address where a summary of the requirements \
                 can be sent. Make clear they may decline.",
            );
        }
        Step::AwaitBudget => {
            text.push_str(
                "ask what budget they have in mind for the project (a rough \
                 figure or range is fine).",
            );
        }
        Step::SuggestFeatures => {
            let budget = snapshot.core_value(CoreField::Budget).unwrap_or("");
            let (min, max) = feature_count_range(budget);
            let _ = write!(
                text,
                "all core fields are collected. Generate between {} and {} \
                 concrete features that fit the purpose, audience, and budget, \
                 list them under FEATURES, and ask whether they would like to \
                 adjust anything.",
                min, max
            );
        }
        Step::ProposeNextSteps => {
            text.push_str(
                "the conversation has covered enough ground. Do not ask for \
                 more requirements. Ask one closing question: whether they \
                 would like our team to prepare a detailed proposal based on \
                 everything gathered so far.",
            );
        }
    }

    text
}

/// System instruction for the one-shot persona and market analysis.
///
/// The caller sends the finalized summary as a JSON user message; the reply
/// must be a single JSON object matching [`crate::models::ProjectAnalysis`].
pub fn analysis_instruction() -> &'static str {
    "You are a product and marketing analyst. The user message contains the \
     finalized requirements of an app project as JSON: its core fields, \
     target audience, and selected features.\n\n\
     Analyze the target audience for this project and respond with ONLY a \
     single JSON object, no prose and no code fences, using exactly these \
     keys:\n\
     - \"brief_description\": one or two sentences describing the project.\n\
     - \"pain_points\": array of strings, frustrations the audience has today.\n\
     - \"delights\": array of strings, what would genuinely please them.\n\
     - \"triggers\": array of strings, situations that push them to look for \
     this product.\n\
     - \"barriers\": array of strings, what holds them back from adopting it.\n\
     - \"ratings\": object with keys \"segment_size\", \"willingness_to_buy\", \
     and \"accessibility\"; each is an object with \"rating\" (an integer \
     from 1 to 5) and \"description\" (one sentence of rationale).\n\
     - \"project_blueprint\": object with \"app_name\", \"platform\", \
     \"target_audience\" (strings) and \"core_features\" (array of strings), \
     drawn from the provided requirements.\n\
     - \"code_snippet\": a starter source file for the project. If the \
     platform mentions iOS or Android, write a Flutter main.dart; otherwise \
     write a Next.js page component. Keep it under 60 lines."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoreEntry, FeatureItem};

    #[test]
    fn empty_snapshot_renders_placeholder_core_only() {
        let block = requirements_block(&RequirementsSnapshot::default());
        assert_eq!(block, "PROJECT CORE\n-\n");
    }

    #[test]
    fn populated_sections_render_in_fixed_layout() {
        let snapshot = RequirementsSnapshot {
            project_core: vec![CoreEntry {
                key: CoreField::Name,
                value: "Ada".into(),
            }],
            target_audience: vec!["students".into()],
            features: vec![FeatureItem::new("Push notifications")],
        };

        let block = requirements_block(&snapshot);

        assert_eq!(
            block,
            "PROJECT CORE\n- Name: Ada\n\nTARGET AUDIENCE\n- Audience: students\n\nFEATURES\n- Push notifications\n"
        );
    }

    #[test]
    fn suggest_features_instruction_carries_budget_tier_counts() {
        let snapshot = RequirementsSnapshot {
            project_core: vec![CoreEntry {
                key: CoreField::Budget,
                value: "$20,000".into(),
            }],
            ..Default::default()
        };

        let text = instruction(Step::SuggestFeatures, &snapshot, None);

        assert!(text.contains("between 10 and 15"));
    }

    #[test]
    fn purpose_instruction_quotes_the_opening_idea() {
        let text = instruction(
            Step::AwaitPurpose,
            &RequirementsSnapshot::default(),
            Some("I want a fitness app"),
        );

        assert!(text.contains("\"I want a fitness app\""));
    }
}
