//! The intake engine: extractor, merger, formatter, and step policy.
//!
//! Everything in this module is pure and synchronous. State goes in by
//! reference, a new value comes out; persistence and the model call live in
//! the caller layer (`store`, `llm`, `api`).

mod extract;
mod format;
mod merge;
mod policy;

pub use extract::extract_fragment;
pub use format::{analysis_instruction, instruction, requirements_block};
pub use merge::merge;
pub use policy::{
    feature_count_range, is_affirmative, is_decline, next_step, PolicyConfig, Step,
};

use crate::models::{Message, RequirementsSnapshot, Role};

/// Result of folding one model reply into a session.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub snapshot: RequirementsSnapshot,
    /// The step the policy selects for the *next* turn, given the merged state.
    pub step: Step,
    /// True when the policy has reached the proposal offer; the caller should
    /// latch this onto the session so a later affirmative reply can branch
    /// out of the model loop.
    pub proposal_offered: bool,
}

/// Decide the current step and render the model instruction for it.
///
/// `messages` is the full history including the user message being answered;
/// the caller truncates what it actually sends to the model separately.
/// `email_declined` is the session's latched refusal of the email question,
/// maintained via [`email_declined`].
pub fn plan_turn(
    snapshot: &RequirementsSnapshot,
    messages: &[Message],
    email_declined: bool,
    config: &PolicyConfig,
) -> (Step, String) {
    let step = next_step(snapshot, messages.len(), email_declined, config);
    let rendered = instruction(step, snapshot, first_user_content(messages));
    (step, rendered)
}

/// Parse a model reply, merge it into the snapshot, and re-evaluate the policy.
pub fn apply_reply(
    snapshot: &RequirementsSnapshot,
    messages: &[Message],
    reply: &str,
    email_declined: bool,
    config: &PolicyConfig,
) -> TurnOutcome {
    let fragment = extract_fragment(reply);
    let merged = merge(snapshot, &fragment);
    let step = next_step(&merged, messages.len(), email_declined, config);
    TurnOutcome {
        snapshot: merged,
        step,
        proposal_offered: step == Step::ProposeNextSteps,
    }
}

/// Whether the most recent user message declines the email question.
///
/// Only true when the email question is actually the pending step for
/// `snapshot`; a refusal word in an answer to some other question (platform,
/// budget) is not a decline. Callers latch the result onto the session so the
/// wizard does not re-ask once the user has said no.
pub fn email_declined(
    snapshot: &RequirementsSnapshot,
    messages: &[Message],
    config: &PolicyConfig,
) -> bool {
    next_step(snapshot, messages.len(), false, config) == Step::AwaitEmail
        && last_user_content(messages).is_some_and(is_decline)
}

fn first_user_content(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

fn last_user_content(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}
