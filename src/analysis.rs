use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::categories::Registry;
use crate::models::{
    AnalysisResult, CategoryStatistics, DeltaMetric, EvaluationRecord, Histogram, PeriodStatistics,
    QuestionAnalysis,
};
use crate::normalize::{normalize, Envelope};
use crate::sentiment::Lexicon;
use crate::suggestions::{compose_summary, suggest, INSUFFICIENT_DATA_SUMMARY};

const KEYWORDS_PER_CATEGORY: usize = 3;

/// Two decimal places, exact ties to even. Values too large to scale are
/// already whole and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / 100.0
}

/// `None` for no values, or when the sum leaves the finite range.
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    let mean = sum / count as f64;
    (count > 0 && mean.is_finite()).then_some(mean)
}

/// Statistics for one period. Categories with no usable rating are left out.
pub fn analyze_period(
    records: &[EvaluationRecord],
    registry: &Registry,
    lexicon: &Lexicon,
) -> PeriodStatistics {
    let mut categories = Vec::new();
    let mut histogram = Histogram::new();

    for (index, category) in registry.categories().iter().enumerate() {
        let ratings: Vec<u8> = records.iter().filter_map(|record| record.ratings[index]).collect();
        let Some(mean_rating) = mean(ratings.iter().map(|&rating| f64::from(rating))) else {
            continue;
        };

        let mut category_histogram = Histogram::new();
        for &rating in &ratings {
            *category_histogram.entry(rating).or_insert(0) += 1;
            *histogram.entry(rating).or_insert(0) += 1;
        }

        let comments: Vec<String> = records
            .iter()
            .filter_map(|record| record.comments[index].clone())
            .collect();
        let mean_sentiment = mean(
            comments
                .iter()
                .map(|comment| f64::from(lexicon.score(Some(comment.as_str())))),
        )
        .unwrap_or(0.0);

        categories.push(CategoryStatistics {
            key: category.key,
            name: category.name,
            mean_rating,
            histogram: category_histogram,
            mean_sentiment,
            keywords: lexicon.keywords(&comments, KEYWORDS_PER_CATEGORY),
            comments,
        });
    }

    PeriodStatistics {
        categories,
        histogram,
        mean_final_score: mean(records.iter().filter_map(|record| record.final_score)),
        record_count: records.len(),
    }
}

/// Pairs a current value with its change since the previous period. Both
/// sides are rounded before subtracting and the difference is rounded again.
pub fn delta(current: f64, previous: Option<f64>) -> DeltaMetric<f64> {
    let value = round2(current);
    DeltaMetric {
        value,
        delta: previous
            .map(|previous| round2(value - round2(previous)))
            .filter(|delta| delta.is_finite()),
    }
}

/// Mean of each group's member category means.
fn group_means(stats: &PeriodStatistics, registry: &Registry) -> BTreeMap<String, f64> {
    registry
        .groups()
        .iter()
        .filter_map(|group| {
            let member_means = registry
                .members(group.key)
                .filter_map(|category| stats.by_name(category.name))
                .map(|category| category.mean_rating);
            mean(member_means).map(|value| (group.name.to_string(), value))
        })
        .collect()
}

pub fn empty_result() -> AnalysisResult {
    AnalysisResult {
        total_evaluations: DeltaMetric { value: 0, delta: None },
        average_media_final: DeltaMetric { value: 0.0, delta: None },
        averages_by_question: BTreeMap::new(),
        averages_by_group: BTreeMap::new(),
        analysis_by_question: BTreeMap::new(),
        score_distribution: Histogram::new(),
        suggestions: Vec::new(),
        executive_summary: INSUFFICIENT_DATA_SUMMARY.to_string(),
        detailed_analysis: None,
    }
}

pub fn analyze(envelope: &Envelope, registry: &Registry, lexicon: &Lexicon) -> AnalysisResult {
    let current_records = normalize(&envelope.current, registry);
    if current_records.is_empty() {
        info!("no usable evaluations in the current period");
        return empty_result();
    }

    let current = analyze_period(&current_records, registry, lexicon);
    let previous = envelope
        .previous
        .as_deref()
        .map(|raw| normalize(raw, registry))
        .filter(|records| !records.is_empty())
        .map(|records| analyze_period(&records, registry, lexicon));

    debug!(
        categories = current.categories.len(),
        has_previous = previous.is_some(),
        "analyzed periods"
    );

    let mut averages_by_question = BTreeMap::new();
    let mut analysis_by_question = BTreeMap::new();
    let mut suggestions = Vec::new();

    for stats in &current.categories {
        let previous_stats = previous.as_ref().and_then(|period| period.by_name(stats.name));
        let average_score = delta(stats.mean_rating, previous_stats.map(|p| p.mean_rating));
        let sentiment_score = delta(stats.mean_sentiment, previous_stats.map(|p| p.mean_sentiment));
        let suggestion = suggest(stats);

        if let Some(made) = &suggestion {
            suggestions.push(made.clone());
        }
        averages_by_question.insert(stats.name.to_string(), average_score);
        analysis_by_question.insert(
            stats.key.to_string(),
            QuestionAnalysis {
                name: stats.name.to_string(),
                average_score,
                score_distribution: stats.histogram.clone(),
                comments: stats.comments.clone(),
                keywords: stats.keywords.clone(),
                sentiment_score,
                suggestion,
            },
        );
    }

    let current_groups = group_means(&current, registry);
    let previous_groups = previous.as_ref().map(|period| group_means(period, registry));
    let averages_by_group = current_groups
        .into_iter()
        .map(|(name, value)| {
            let previous_value = previous_groups
                .as_ref()
                .and_then(|groups| groups.get(&name).copied());
            let metric = delta(value, previous_value);
            (name, metric)
        })
        .collect();

    let record_count = current.record_count as i64;
    let total_evaluations = DeltaMetric {
        value: record_count,
        delta: previous.as_ref().map(|period| record_count - period.record_count as i64),
    };

    let average_media_final = match current.mean_final_score {
        Some(value) => delta(value, previous.as_ref().and_then(|period| period.mean_final_score)),
        None => DeltaMetric { value: 0.0, delta: None },
    };

    info!(
        evaluations = record_count,
        suggestions = suggestions.len(),
        "analysis complete"
    );

    AnalysisResult {
        executive_summary: compose_summary(&suggestions, average_media_final.value),
        total_evaluations,
        average_media_final,
        averages_by_question,
        averages_by_group,
        analysis_by_question,
        score_distribution: current.histogram,
        suggestions,
        detailed_analysis: None,
    }
}
