//! Wire types of the remote analysis API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub session_id: String,
    pub cv_text: String,
    pub filename: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordReport {
    #[serde(default)]
    pub found: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub role_match: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDebugInfo {
    pub text_length: usize,
    pub word_count: usize,
    #[serde(default)]
    pub first_100_chars: String,
    #[serde(default)]
    pub parsing_successful: bool,
}

/// Full ATS analysis of one résumé.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub id: String,
    pub session_id: String,
    pub filename: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    pub created_at: String,
    /// 0 – 100
    pub ats_score: u32,
    pub identified_role: String,
    pub keywords: KeywordReport,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub interview_questions: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_to_improve: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<AnalysisDebugInfo>,
}

/// Row of a session's analysis history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSummary {
    pub id: String,
    pub filename: String,
    pub ats_score: u32,
    pub identified_role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub analysis_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub has_actions: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DebugParseRequest<'a> {
    pub cv_text: &'a str,
    pub filename: &'a str,
}

/// What the analysis API saw of the submitted text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseDebugReport {
    pub filename: String,
    pub text_length: usize,
    pub word_count: usize,
    pub line_count: usize,
    #[serde(default)]
    pub first_200_chars: String,
    #[serde(default)]
    pub last_200_chars: String,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}
