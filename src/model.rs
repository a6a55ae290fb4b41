use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Resolved client configuration, built once from CLI arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub connect_timeout_ms: u64,
    pub certificate_path: Option<std::path::PathBuf>,
    pub check_weight_sum: bool,
}

/// One uploaded document, read at the moment of submission.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub mime: mime::Mime,
    pub bytes: Bytes,
}

/// The three scoring weights, kept as the literal strings the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    pub foundation: String,
    pub competency: String,
    pub density: String,
}

impl Weights {
    /// Multipart field names paired with their values, in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("w_foundation", self.foundation.as_str()),
            ("w_competency", self.competency.as_str()),
            ("w_density", self.density.as_str()),
        ]
    }
}

/// Outbound payload for a single analysis call.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub document: Document,
    pub weights: Weights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    pub foundation_score: f64,
    pub competency_score: f64,
    pub density_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_ahp_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rank: u32,
    pub profile: String,
    pub score: f64,
    pub explanation: String,
    pub details: ScoreDetails,
}

/// Response body of a successful analysis. Recommendations arrive best-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub student_metadata: StudentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_credits: Option<u32>,
    pub recommendations: Vec<Recommendation>,
}

/// Controller lifecycle state for one submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitState {
    Idle,
    Submitting,
    Success,
    Failed,
}

impl SubmitState {
    pub fn can_submit(self) -> bool {
        !matches!(self, SubmitState::Submitting)
    }
}

/// Which of the two mutually exclusive views is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveView {
    Submission,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerLabel {
    Ready,
    Busy,
}

impl TriggerLabel {
    pub fn text(self) -> &'static str {
        match self {
            TriggerLabel::Ready => "Analyze Transcript",
            TriggerLabel::Busy => "Analyzing…",
        }
    }
}

/// Presentation state owned by the submission controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub trigger_enabled: bool,
    pub trigger_label: TriggerLabel,
    pub error: Option<String>,
    pub active_view: ActiveView,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            trigger_enabled: true,
            trigger_label: TriggerLabel::Ready,
            error: None,
            active_view: ActiveView::Submission,
        }
    }
}

/// Events emitted by the controller and consumed by presentation layers.
#[derive(Debug, Clone)]
pub enum SubmitEvent {
    StateChanged {
        state: SubmitState,
        view: ViewState,
    },
    Dashboard(crate::render::DashboardUpdate),
    Completed {
        // Box to keep SubmitEvent small; AnalysisResult carries a Vec and strings.
        result: Box<AnalysisResult>,
        completed_at: String,
    },
    Info(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_response_with_null_metadata_and_extra_fields() {
        let json = r#"{
            "status": "success",
            "student_metadata": {"name": null, "id": "2201", "gpa": null},
            "total_credits": 96,
            "recommendations": [{
                "profile": "AI", "rank": 1, "score": 0.71,
                "details": {"foundation_score": 0.8, "competency_score": 0.7,
                            "density_score": 0.6, "final_ahp_score": 0.71},
                "explanation": "Highly recommended"
            }]
        }"#;
        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.student_metadata.name, None);
        assert_eq!(parsed.student_metadata.id.as_deref(), Some("2201"));
        assert_eq!(parsed.total_credits, Some(96));
        assert_eq!(parsed.recommendations[0].details.final_ahp_score, Some(0.71));
    }

    #[test]
    fn rejects_recommendation_without_details() {
        let json = r#"{
            "student_metadata": {"name": "A", "id": "1", "gpa": 3.0},
            "recommendations": [{"rank": 1, "profile": "AI", "score": 0.5, "explanation": ""}]
        }"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn weight_fields_use_wire_names() {
        let w = Weights {
            foundation: "0.2".into(),
            competency: "0.5".into(),
            density: "0.3".into(),
        };
        let names: Vec<&str> = w.fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["w_foundation", "w_competency", "w_density"]);
    }

    #[test]
    fn only_submitting_blocks_new_submission() {
        assert!(SubmitState::Idle.can_submit());
        assert!(SubmitState::Failed.can_submit());
        assert!(SubmitState::Success.can_submit());
        assert!(!SubmitState::Submitting.can_submit());
    }
}
