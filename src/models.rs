use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rating value (1 to 5) mapped to the number of times it was given.
pub type Histogram = BTreeMap<u8, usize>;

/// One evaluation after normalization. `ratings` and `comments` are indexed
/// like the registry's category list.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    pub institution: Option<String>,
    pub course: Option<String>,
    pub final_score: Option<f64>,
    pub ratings: Vec<Option<u8>>,
    pub comments: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStatistics {
    pub key: &'static str,
    pub name: &'static str,
    pub mean_rating: f64,
    pub histogram: Histogram,
    pub mean_sentiment: f64,
    pub comments: Vec<String>,
    pub keywords: Vec<String>,
}

/// Analyzer output for one period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodStatistics {
    pub categories: Vec<CategoryStatistics>,
    pub histogram: Histogram,
    pub mean_final_score: Option<f64>,
    pub record_count: usize,
}

impl PeriodStatistics {
    pub fn by_name(&self, name: &str) -> Option<&CategoryStatistics> {
        self.categories.iter().find(|stats| stats.name == name)
    }
}

/// A value paired with its change since the previous period. `delta` is
/// `None` when there is nothing to compare against, which serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaMetric<T> {
    pub value: T,
    pub delta: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Critical,
    Attention,
    StrongPoint,
    GoodPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub category: String,
    pub key: String,
    pub score: f64,
    pub sentiment: f64,
    pub polarized: bool,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnalysis {
    pub name: String,
    pub average_score: DeltaMetric<f64>,
    pub score_distribution: Histogram,
    pub comments: Vec<String>,
    pub keywords: Vec<String>,
    pub sentiment_score: DeltaMetric<f64>,
    pub suggestion: Option<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_evaluations: DeltaMetric<i64>,
    pub average_media_final: DeltaMetric<f64>,
    pub averages_by_question: BTreeMap<String, DeltaMetric<f64>>,
    pub averages_by_group: BTreeMap<String, DeltaMetric<f64>>,
    pub analysis_by_question: BTreeMap<String, QuestionAnalysis>,
    pub score_distribution: Histogram,
    pub suggestions: Vec<Suggestion>,
    pub executive_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<String>,
}
