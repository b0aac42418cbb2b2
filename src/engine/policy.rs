//! Conversation step policy.
//!
//! The wizard's flow is an explicit state machine over the current snapshot
//! plus two ancillary signals (message count, last user message). The
//! instruction text sent to the model is a rendering of the selected state,
//! never the mechanism driving it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{CoreField, RequirementsSnapshot};

/// Which question the model should be instructed to ask next.
///
/// Evaluated fresh every turn; there is no terminal state. The proposal
/// ceiling overrides everything else, after that the first unmet field wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitName,
    AwaitPurpose,
    AwaitRegion,
    AwaitPlatform,
    AwaitPlatformDetail,
    AwaitEmail,
    AwaitBudget,
    SuggestFeatures,
    ProposeNextSteps,
}

/// Tunables for the step policy and the surrounding turn loop.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Total message count at which the wizard stops asking questions and
    /// offers a proposal instead.
    pub proposal_ceiling: usize,
    /// How many trailing messages are sent to the model per turn.
    pub history_window: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            proposal_ceiling: 20,
            history_window: 20,
        }
    }
}

static DECLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(no|nope|skip|rather not|prefer not|won'?t|don'?t)\b")
        .expect("valid decline pattern")
});

static AFFIRMATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(yes|yeah|yep|sure|ok(ay)?|please do|sounds good|absolutely|go ahead)\b")
        .expect("valid affirmative pattern")
});

/// First number in the text, with optional `$`, thousands separators, and a
/// `k` suffix. Best-effort only; free-text budgets are whatever the user typed.
static BUDGET_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$?\s*(\d[\d,]*(?:\.\d+)?)\s*(k\b)?").expect("valid budget pattern")
});

/// Select the next wizard step for the given session state.
///
/// Pure and total: every input yields exactly one step, and an unmet
/// precondition simply resolves to the earliest unmet state.
///
/// `email_declined` must only be set when the user refused the email question
/// itself (see [`crate::engine::email_declined`]); refusal words answering a
/// different question must not skip the email step.
pub fn next_step(
    snapshot: &RequirementsSnapshot,
    message_count: usize,
    email_declined: bool,
    config: &PolicyConfig,
) -> Step {
    if message_count >= config.proposal_ceiling {
        return Step::ProposeNextSteps;
    }
    if !snapshot.has(CoreField::Name) {
        return Step::AwaitName;
    }
    if !snapshot.has(CoreField::Purpose) {
        return Step::AwaitPurpose;
    }
    if !snapshot.has(CoreField::Region) {
        return Step::AwaitRegion;
    }
    let Some(platform) = snapshot.core_value(CoreField::Platform) else {
        return Step::AwaitPlatform;
    };
    if needs_platform_detail(platform) {
        return Step::AwaitPlatformDetail;
    }
    if !snapshot.has(CoreField::Email) && !email_declined {
        return Step::AwaitEmail;
    }
    if !snapshot.has(CoreField::Budget) {
        return Step::AwaitBudget;
    }
    Step::SuggestFeatures
}

/// A mobile-ish platform that does not yet name a mobile OS needs the
/// follow-up question.
fn needs_platform_detail(platform: &str) -> bool {
    let lower = platform.to_lowercase();
    (lower.contains("mobile") || lower.contains("both"))
        && !lower.contains("ios")
        && !lower.contains("android")
}

/// Whether a user message reads as declining the current question.
pub fn is_decline(text: &str) -> bool {
    DECLINE.is_match(text)
}

/// Whether a user message reads as accepting the proposal offer.
pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE.is_match(text)
}

/// How many features to generate for a given free-text budget.
///
/// Tiers: under $1 000 ⇒ 2–4; up to $15 000 ⇒ 5–8; above ⇒ 10–15. A budget
/// we cannot read a number out of falls to the middle tier.
pub fn feature_count_range(budget: &str) -> (u8, u8) {
    match parse_budget_amount(budget) {
        Some(amount) if amount < 1_000.0 => (2, 4),
        Some(amount) if amount > 15_000.0 => (10, 15),
        _ => (5, 8),
    }
}

/// Best-effort: the first numeral in the text wins, even when a later one is
/// the intended budget ("team of 3, budget 500" reads as 3).
fn parse_budget_amount(text: &str) -> Option<f64> {
    let captures = BUDGET_AMOUNT.captures(text)?;
    let digits = captures.get(1)?.as_str().replace(',', "");
    let amount: f64 = digits.parse().ok()?;
    if captures.get(2).is_some() {
        Some(amount * 1_000.0)
    } else {
        Some(amount)
    }
}
