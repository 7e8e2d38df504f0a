use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::categories::Registry;
use crate::error::{InsightError, Result};
use crate::models::EvaluationRecord;

/// Raw input for one run. An absent `previous` and an empty one both mean
/// there is no comparison period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub current: Vec<Value>,
    pub previous: Option<Vec<Value>>,
}

/// Accepts either `{"current": [...], "previous": [...]}` or a bare list of
/// records, which is read as the current period.
pub fn parse_envelope(raw: &str) -> Result<Envelope> {
    let value: Value = serde_json::from_str(raw)?;

    match value {
        Value::Array(current) => Ok(Envelope { current, previous: None }),
        Value::Object(mut map) => {
            let current = period_field(map.remove("current"), "current")?.unwrap_or_default();
            let previous = period_field(map.remove("previous"), "previous")?;
            Ok(Envelope { current, previous })
        }
        other => Err(InsightError::MalformedEnvelope(format!(
            "expected an object or a list of records, found {}",
            kind_of(&other)
        ))),
    }
}

fn period_field(value: Option<Value>, field: &str) -> Result<Option<Vec<Value>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(records)) => Ok(Some(records)),
        Some(other) => Err(InsightError::MalformedEnvelope(format!(
            "`{field}` must be a list of records, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Turns raw records into typed rows. Unusable values become absent; rows
/// without a single usable rating are dropped.
pub fn normalize(raw: &[Value], registry: &Registry) -> Vec<EvaluationRecord> {
    let records: Vec<EvaluationRecord> = raw
        .iter()
        .filter_map(|value| normalize_record(value, registry))
        .collect();

    debug!(
        received = raw.len(),
        retained = records.len(),
        dropped = raw.len() - records.len(),
        "normalized evaluation records"
    );
    records
}

fn normalize_record(value: &Value, registry: &Registry) -> Option<EvaluationRecord> {
    let fields = value.as_object()?;

    let ratings: Vec<Option<u8>> = registry
        .categories()
        .iter()
        .map(|category| fields.get(&category.rating_field()).and_then(coerce_rating))
        .collect();

    if ratings.iter().all(Option::is_none) {
        return None;
    }

    let comments = registry
        .categories()
        .iter()
        .map(|category| fields.get(&category.comment_field()).and_then(coerce_text))
        .collect();

    Some(EvaluationRecord {
        institution: fields.get("instituicao_id").and_then(coerce_label),
        course: fields.get("curso_id").and_then(coerce_label),
        final_score: fields.get("media_final").and_then(coerce_number),
        ratings,
        comments,
    })
}

pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Whole numbers from 1 to 5; anything else is absent.
pub fn coerce_rating(value: &Value) -> Option<u8> {
    let number = coerce_number(value)?;
    if number.fract() != 0.0 || !(1.0..=5.0).contains(&number) {
        return None;
    }
    Some(number as u8)
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn coerce_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// "instituição X, curso Y" when every record shares the same context.
pub fn scope_label(records: &[EvaluationRecord]) -> Option<String> {
    let institution = single_value(records.iter().map(|record| record.institution.as_deref()));
    let course = single_value(records.iter().map(|record| record.course.as_deref()));

    match (institution, course) {
        (Some(institution), Some(course)) => Some(format!("instituição {institution}, curso {course}")),
        (Some(institution), None) => Some(format!("instituição {institution}")),
        (None, Some(course)) => Some(format!("curso {course}")),
        (None, None) => None,
    }
}

fn single_value<'a>(mut values: impl Iterator<Item = Option<&'a str>>) -> Option<&'a str> {
    let first = values.next()??;
    values.all(|value| value == Some(first)).then_some(first)
}

/// Keeps only the most recent evaluation of each respondent (`usuario_id`,
/// ordered by `criado_em`). The survivor takes the position of the
/// respondent's first record; anonymous records are all kept.
pub fn latest_per_respondent(records: Vec<Value>) -> Vec<Value> {
    let mut kept: Vec<Value> = Vec::with_capacity(records.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let respondent = record.get("usuario_id").and_then(coerce_label);
        let Some(respondent) = respondent else {
            kept.push(record);
            continue;
        };

        match positions.get(&respondent) {
            Some(&position) => {
                if submitted_at(&record) > submitted_at(&kept[position]) {
                    kept[position] = record;
                }
            }
            None => {
                positions.insert(respondent, kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

fn submitted_at(record: &Value) -> Option<NaiveDateTime> {
    let text = record.get("criado_em")?.as_str()?.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.naive_utc());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(timestamp);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn position(key: &str) -> usize {
        Registry::default()
            .categories()
            .iter()
            .position(|category| category.key == key)
            .unwrap()
    }

    #[test]
    fn parses_full_envelope() {
        let envelope = parse_envelope(r#"{"current": [{"nota_didatica": 4}], "previous": []}"#).unwrap();
        assert_eq!(envelope.current.len(), 1);
        assert_eq!(envelope.previous, Some(vec![]));
    }

    #[test]
    fn bare_list_is_current_period() {
        let envelope = parse_envelope(r#"[{"nota_didatica": 4}, {"nota_didatica": 2}]"#).unwrap();
        assert_eq!(envelope.current.len(), 2);
        assert!(envelope.previous.is_none());
    }

    #[test]
    fn missing_current_reads_as_empty() {
        let envelope = parse_envelope("{}").unwrap();
        assert!(envelope.current.is_empty());
        assert!(envelope.previous.is_none());
    }

    #[test]
    fn rejects_unparseable_input() {
        let err = parse_envelope("not json").unwrap_err();
        assert!(matches!(err, InsightError::MalformedEnvelope(_)));
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(matches!(parse_envelope("42"), Err(InsightError::MalformedEnvelope(_))));
        assert!(matches!(
            parse_envelope(r#"{"current": "abc"}"#),
            Err(InsightError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn unparseable_rating_becomes_absent_but_record_is_kept() {
        let raw = vec![json!({
            "nota_didatica": "abc",
            "nota_infraestrutura": "4",
            "nota_biblioteca": 5,
            "media_final": "8.5"
        })];
        let records = normalize(&raw, &Registry::default());
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.ratings[position("didatica")], None);
        assert_eq!(record.ratings[position("infraestrutura")], Some(4));
        assert_eq!(record.ratings[position("biblioteca")], Some(5));
        assert_eq!(record.final_score, Some(8.5));
    }

    #[test]
    fn drops_records_without_any_rating() {
        let raw = vec![
            json!({"nota_didatica": null, "comentario_didatica": "bom"}),
            json!("not a record"),
            json!({"nota_conteudo": 3}),
        ];
        let records = normalize(&raw, &Registry::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ratings[position("conteudo")], Some(3));
    }

    #[test]
    fn out_of_range_and_fractional_ratings_are_absent() {
        assert_eq!(coerce_rating(&json!(0)), None);
        assert_eq!(coerce_rating(&json!(6)), None);
        assert_eq!(coerce_rating(&json!(3.5)), None);
        assert_eq!(coerce_rating(&json!("5.0")), Some(5));
        assert_eq!(coerce_rating(&json!(true)), None);
    }

    #[test]
    fn keeps_context_and_comments() {
        let raw = vec![json!({
            "instituicao_id": 7,
            "curso_id": "ADS",
            "nota_didatica": 5,
            "comentario_didatica": "Excelente",
            "comentario_conteudo": "   "
        })];
        let record = &normalize(&raw, &Registry::default())[0];
        assert_eq!(record.institution.as_deref(), Some("7"));
        assert_eq!(record.course.as_deref(), Some("ADS"));
        assert_eq!(record.comments[position("didatica")].as_deref(), Some("Excelente"));
        assert_eq!(record.comments[position("conteudo")], None);
    }

    #[test]
    fn scope_label_requires_shared_context() {
        let registry = Registry::default();
        let shared = normalize(
            &[
                json!({"instituicao_id": 7, "curso_id": "ADS", "nota_didatica": 4}),
                json!({"instituicao_id": "7", "curso_id": "ADS", "nota_didatica": 5}),
            ],
            &registry,
        );
        assert_eq!(scope_label(&shared).as_deref(), Some("instituição 7, curso ADS"));

        let mixed = normalize(
            &[
                json!({"instituicao_id": 7, "curso_id": "ADS", "nota_didatica": 4}),
                json!({"instituicao_id": 7, "curso_id": "SI", "nota_didatica": 5}),
            ],
            &registry,
        );
        assert_eq!(scope_label(&mixed).as_deref(), Some("instituição 7"));
        assert_eq!(scope_label(&[]), None);
    }

    #[test]
    fn keeps_latest_evaluation_per_respondent() {
        let records = vec![
            json!({"usuario_id": 1, "criado_em": "2025-03-01 10:00:00", "nota_didatica": 2}),
            json!({"nota_didatica": 3}),
            json!({"usuario_id": 1, "criado_em": "2025-04-01T09:00:00Z", "nota_didatica": 5}),
            json!({"usuario_id": 2, "criado_em": "2025-04-02", "nota_didatica": 4}),
            json!({"usuario_id": 2, "criado_em": "2025-01-02", "nota_didatica": 1}),
        ];
        let kept = latest_per_respondent(records);
        let ratings: Vec<i64> = kept
            .iter()
            .map(|record| record["nota_didatica"].as_i64().unwrap())
            .collect();
        assert_eq!(ratings, vec![5, 3, 4]);
    }
}
