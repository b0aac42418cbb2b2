use serde::{Deserialize, Serialize};

/// Persona and market analysis generated from a finalized summary.
///
/// This is model output parsed into a fixed shape: the instruction pins the
/// keys down and the deserializer rejects anything that drifts from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub brief_description: String,
    pub pain_points: Vec<String>,
    pub delights: Vec<String>,
    /// Situations that push the audience to reach for the product.
    pub triggers: Vec<String>,
    /// What keeps the audience from adopting it.
    pub barriers: Vec<String>,
    pub ratings: AnalysisRatings,
    pub project_blueprint: ProjectBlueprint,
    /// Starter source file matching the project's platform.
    pub code_snippet: String,
}

/// Market viability scores, each on a 1–5 scale with a one-line rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRatings {
    pub segment_size: RatingDetail,
    pub willingness_to_buy: RatingDetail,
    pub accessibility: RatingDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDetail {
    pub rating: u8,
    pub description: String,
}

/// Condensed build plan echoed back out of the gathered requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBlueprint {
    pub app_name: String,
    pub platform: String,
    pub target_audience: String,
    pub core_features: Vec<String>,
}

impl ProjectAnalysis {
    /// Parse a model reply, tolerating a ```json fence around the object.
    pub fn from_reply(reply: &str) -> Result<Self, serde_json::Error> {
        let body = reply.trim();
        let body = body
            .strip_prefix("```json")
            .or_else(|| body.strip_prefix("```"))
            .unwrap_or(body);
        let body = body.strip_suffix("```").unwrap_or(body);
        serde_json::from_str(body.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
        "brief_description": "A habit tracker for remote teams.",
        "pain_points": ["losing track of routines"],
        "delights": ["streak celebrations"],
        "triggers": ["new remote job"],
        "barriers": ["yet another app"],
        "ratings": {
            "segment_size": { "rating": 4, "description": "large remote workforce" },
            "willingness_to_buy": { "rating": 3, "description": "crowded market" },
            "accessibility": { "rating": 5, "description": "easy to reach online" }
        },
        "project_blueprint": {
            "app_name": "HabitHub",
            "platform": "web",
            "target_audience": "remote workers",
            "core_features": ["streaks", "team boards"]
        },
        "code_snippet": "fn main() {}"
    }"#;

    #[test]
    fn parses_a_bare_json_reply() {
        let analysis = ProjectAnalysis::from_reply(REPLY).unwrap();
        assert_eq!(analysis.project_blueprint.app_name, "HabitHub");
        assert_eq!(analysis.ratings.segment_size.rating, 4);
        assert_eq!(analysis.pain_points.len(), 1);
    }

    #[test]
    fn parses_a_fenced_json_reply() {
        let fenced = format!("```json\n{REPLY}\n```");
        let analysis = ProjectAnalysis::from_reply(&fenced).unwrap();
        assert_eq!(analysis.project_blueprint.platform, "web");
    }

    #[test]
    fn prose_replies_are_rejected() {
        assert!(ProjectAnalysis::from_reply("Here is my analysis: it looks great!").is_err());
    }
}
