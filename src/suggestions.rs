use std::cmp::Ordering;

use crate::analysis::round2;
use crate::models::{CategoryStatistics, Histogram, Suggestion, SuggestionKind};

pub const INSUFFICIENT_DATA_SUMMARY: &str =
    "Não há dados suficientes para gerar um resumo executivo.";

pub const POLARIZATION_NOTICE: &str = " **Atenção à polarização:** as notas se concentram nos extremos (1 e 5), indicando experiências muito divergentes entre os alunos. Investigue os dois grupos separadamente.";

const POLARIZATION_MIN_VOTES: usize = 10;
const POLARIZATION_EXTREME_SHARE: f64 = 0.4;
const SUMMARY_TOP: usize = 2;

struct Band {
    kind: SuggestionKind,
    matches: fn(f64, f64) -> bool,
}

/// Evaluated in order; the first band that matches wins.
const BANDS: &[Band] = &[
    Band {
        kind: SuggestionKind::Critical,
        matches: |score, sentiment| score < 2.5 && sentiment < -0.5,
    },
    Band {
        kind: SuggestionKind::Attention,
        matches: |score, sentiment| score < 3.5 && sentiment < 0.0,
    },
    Band {
        kind: SuggestionKind::StrongPoint,
        matches: |score, sentiment| score > 4.0 && sentiment > 0.5,
    },
    Band {
        kind: SuggestionKind::GoodPoint,
        matches: |score, sentiment| score > 3.5 && sentiment >= 0.0,
    },
];

pub fn classify(score: f64, sentiment: f64) -> Option<SuggestionKind> {
    BANDS
        .iter()
        .find(|band| (band.matches)(score, sentiment))
        .map(|band| band.kind)
}

pub fn is_polarized(histogram: &Histogram) -> bool {
    let total: usize = histogram.values().sum();
    if total <= POLARIZATION_MIN_VOTES {
        return false;
    }
    let extremes = histogram.get(&1).copied().unwrap_or(0) + histogram.get(&5).copied().unwrap_or(0);
    extremes as f64 / total as f64 > POLARIZATION_EXTREME_SHARE
}

pub fn suggest(stats: &CategoryStatistics) -> Option<Suggestion> {
    let kind = classify(stats.mean_rating, stats.mean_sentiment)?;
    let score = round2(stats.mean_rating);
    let polarized = is_polarized(&stats.histogram);

    let mut text = guidance(kind, stats.name, score);
    if polarized {
        text.push_str(POLARIZATION_NOTICE);
    }

    Some(Suggestion {
        kind,
        category: stats.name.to_string(),
        key: stats.key.to_string(),
        score,
        sentiment: round2(stats.mean_sentiment),
        polarized,
        suggestion: text,
    })
}

fn guidance(kind: SuggestionKind, name: &str, score: f64) -> String {
    match kind {
        SuggestionKind::Critical => format!(
            "**Ponto Crítico em {name}:** A média ({score}) é muito baixa e o sentimento é fortemente negativo. É urgente investigar as causas e implementar um plano de ação corretivo imediato. Priorize a escuta ativa dos alunos para entender os problemas específicos."
        ),
        SuggestionKind::Attention => format!(
            "**Ponto de Atenção em {name}:** A média ({score}) é baixa e o sentimento é negativo. Recomenda-se focar em melhorias nesta área. Analise os comentários para identificar os pontos fracos e planeje ações de médio prazo."
        ),
        SuggestionKind::StrongPoint => format!(
            "**Ponto Forte em {name}:** A média ({score}) é alta e o sentimento é fortemente positivo. Mantenha e promova as boas práticas desta área. Considere usar este sucesso como modelo para outras áreas."
        ),
        SuggestionKind::GoodPoint => format!(
            "**Ponto Positivo em {name}:** A média ({score}) é boa e o sentimento é neutro a positivo. Continue monitorando e buscando pequenas melhorias para manter a qualidade."
        ),
    }
}

pub fn compose_summary(suggestions: &[Suggestion], mean_final_score: f64) -> String {
    if suggestions.is_empty() {
        return INSUFFICIENT_DATA_SUMMARY.to_string();
    }

    let mut strong: Vec<&Suggestion> = suggestions
        .iter()
        .filter(|s| s.kind == SuggestionKind::StrongPoint)
        .collect();
    let mut attention: Vec<&Suggestion> = suggestions
        .iter()
        .filter(|s| matches!(s.kind, SuggestionKind::Attention | SuggestionKind::Critical))
        .collect();

    strong.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    attention.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
    strong.truncate(SUMMARY_TOP);
    attention.truncate(SUMMARY_TOP);

    let mut sentences = vec![format!(
        "A média final geral das avaliações no período é **{mean_final_score:.2}**."
    )];

    if !strong.is_empty() {
        sentences.push(format!(
            "Os principais pontos fortes são {}.",
            join_names(&strong)
        ));
    }
    if !attention.is_empty() {
        sentences.push(format!(
            "As áreas que mais precisam de atenção são {}.",
            join_names(&attention)
        ));
    }

    let closing = match (strong.is_empty(), attention.is_empty()) {
        (false, false) => "Recomenda-se usar as boas práticas dos pontos fortes como referência para o plano de ação das áreas de atenção.",
        (true, false) => "Recomenda-se priorizar um plano de ação imediato para as áreas de atenção, acompanhando os resultados no próximo período.",
        (false, true) => "Recomenda-se manter as boas práticas atuais e divulgar os pontos fortes como referência para a instituição.",
        (true, true) => "Os resultados estão estáveis; recomenda-se acompanhar a evolução das notas nos próximos períodos.",
    };
    sentences.push(closing.to_string());

    sentences.join(" ")
}

fn join_names(suggestions: &[&Suggestion]) -> String {
    let names: Vec<String> = suggestions
        .iter()
        .map(|s| format!("**{}** ({:.2})", s.category, s.score))
        .collect();
    names.join(" e ")
}
