use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{AnalysisResult, DeltaMetric, SuggestionKind};

fn delta_label(delta: Option<f64>) -> String {
    match delta {
        Some(delta) if delta > 0.0 => format!(" (+{delta:.2} vs. período anterior)"),
        Some(delta) => format!(" ({delta:.2} vs. período anterior)"),
        None => String::new(),
    }
}

fn metric_label(metric: &DeltaMetric<f64>) -> String {
    format!("{:.2}{}", metric.value, delta_label(metric.delta))
}

fn kind_label(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::Critical => "Crítico",
        SuggestionKind::Attention => "Atenção",
        SuggestionKind::StrongPoint => "Ponto forte",
        SuggestionKind::GoodPoint => "Positivo",
    }
}

pub fn build_report(scope: Option<&str>, generated_on: NaiveDate, result: &AnalysisResult) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("todas as avaliações");

    let _ = writeln!(output, "# Relatório de Análise de Avaliações");
    let _ = writeln!(output, "Gerado em {} para {}", generated_on.format("%d/%m/%Y"), scope_label);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Resumo Geral");
    let total = result.total_evaluations;
    let total_delta = match total.delta {
        Some(delta) if delta > 0 => format!(" (+{delta} vs. período anterior)"),
        Some(delta) => format!(" ({delta} vs. período anterior)"),
        None => String::new(),
    };
    let _ = writeln!(output, "- Total de avaliações: {}{}", total.value, total_delta);
    let _ = writeln!(output, "- Média final geral: {}", metric_label(&result.average_media_final));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Resumo Executivo");
    let _ = writeln!(output, "{}", result.executive_summary);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Médias por Pergunta");

    if result.analysis_by_question.is_empty() {
        let _ = writeln!(output, "Nenhuma avaliação registrada para este período.");
    } else {
        let _ = writeln!(output, "| Pergunta | Média | Sentimento | Distribuição | Palavras-chave |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for analysis in result.analysis_by_question.values() {
            let distribution: Vec<String> = analysis
                .score_distribution
                .iter()
                .map(|(rating, count)| format!("{rating}: {count}"))
                .collect();
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                analysis.name,
                metric_label(&analysis.average_score),
                metric_label(&analysis.sentiment_score),
                distribution.join(", "),
                analysis.keywords.join(", ")
            );
        }
    }

    if !result.averages_by_group.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Médias por Grupo");
        for (name, metric) in &result.averages_by_group {
            let _ = writeln!(output, "- {}: {}", name, metric_label(metric));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sugestões e Plano de Ação");

    if result.suggestions.is_empty() {
        let _ = writeln!(output, "Nenhuma sugestão gerada para este período.");
    } else {
        for suggestion in &result.suggestions {
            let _ = writeln!(output, "- [{}] {}", kind_label(suggestion.kind), suggestion.suggestion);
        }
    }

    if let Some(detailed) = &result.detailed_analysis {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Análise Detalhada");
        let _ = writeln!(output, "{}", detailed);
    }

    output
}
