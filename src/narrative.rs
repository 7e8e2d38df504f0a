use std::io::Write;
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{InsightError, Result};
use crate::models::{AnalysisResult, Histogram};

pub const NARRATIVE_UNAVAILABLE: &str =
    "Não foi possível gerar a análise detalhada neste momento.";

const SAMPLE_COMMENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBrief {
    pub name: String,
    pub average_score: f64,
    pub sentiment_score: f64,
    pub score_distribution: Histogram,
    pub sample_comments: Vec<String>,
}

/// What a narrator gets to work with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeRequest {
    pub average_media_final: f64,
    pub total_evaluations: i64,
    pub categories: Vec<CategoryBrief>,
}

impl NarrativeRequest {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let categories = result
            .analysis_by_question
            .values()
            .map(|analysis| CategoryBrief {
                name: analysis.name.clone(),
                average_score: analysis.average_score.value,
                sentiment_score: analysis.sentiment_score.value,
                score_distribution: analysis.score_distribution.clone(),
                sample_comments: analysis.comments.iter().take(SAMPLE_COMMENTS).cloned().collect(),
            })
            .collect();

        Self {
            average_media_final: result.average_media_final.value,
            total_evaluations: result.total_evaluations.value,
            categories,
        }
    }
}

/// Free-text generation over the computed statistics.
pub trait Narrator {
    fn narrate(&self, request: &NarrativeRequest) -> Result<String>;
}

/// Runs an external program with the request as JSON on stdin and takes its
/// stdout as the narrative.
#[derive(Debug, Clone)]
pub struct CommandNarrator {
    program: String,
    args: Vec<String>,
}

impl CommandNarrator {
    /// Arguments are passed through as given, without shell splitting.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Option<Self> {
        let program = program.into();
        if program.trim().is_empty() {
            return None;
        }
        Some(Self { program, args })
    }
}

impl Narrator for CommandNarrator {
    fn narrate(&self, request: &NarrativeRequest) -> Result<String> {
        let payload = serde_json::to_vec(request)
            .map_err(|err| InsightError::Narrator(err.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(InsightError::Narrator(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(InsightError::Narrator(format!("{} returned no text", self.program)));
        }
        Ok(text)
    }
}

/// Adds the narrator's text to the result. A failing narrator degrades to a
/// fixed placeholder; empty results are left untouched.
pub fn with_narrative(mut result: AnalysisResult, narrator: &dyn Narrator) -> AnalysisResult {
    if result.total_evaluations.value == 0 {
        debug!("skipping narrative for empty analysis");
        return result;
    }

    let request = NarrativeRequest::from_result(&result);
    let text = match narrator.narrate(&request) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "narrative generation failed");
            NARRATIVE_UNAVAILABLE.to_string()
        }
    };
    result.detailed_analysis = Some(text);
    result
}
