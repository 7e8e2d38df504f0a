use std::collections::HashMap;

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "ruim",
    "péssimo",
    "lento",
    "antigo",
    "quebrado",
    "difícil",
    "desorganizado",
    "insatisfeito",
    "problema",
    "falta",
    "demora",
    "ineficiente",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "bom",
    "ótimo",
    "excelente",
    "rápido",
    "novo",
    "funciona",
    "fácil",
    "organizado",
    "satisfeito",
    "eficiente",
];

pub const STOPWORDS: &[&str] = &[
    "a", "o", "e", "é", "de", "do", "da", "dos", "das", "em", "no", "na", "nos", "nas", "um",
    "uma", "para", "com", "sem", "não", "que", "os", "as", "por", "mais", "muito", "muita",
    "mas", "se", "ao", "aos", "foi", "tem", "são", "ser", "como", "está", "estão", "isso",
    "este", "esta", "essa", "esse", "pelo", "pela", "bem", "também", "já", "ou", "eu", "nós",
    "ele", "ela", "eles", "elas", "seu", "sua", "meu", "minha",
];

const STRIPPED_PUNCTUATION: &[char] = &[',', '.', '!', '?'];

/// Keyword tables behind the sentiment scorer and keyword extractor.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub positive: &'static [&'static str],
    pub negative: &'static [&'static str],
    pub stopwords: &'static [&'static str],
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive: POSITIVE_KEYWORDS,
            negative: NEGATIVE_KEYWORDS,
            stopwords: STOPWORDS,
        }
    }
}

impl Lexicon {
    /// Positive minus negative keyword hits. Each keyword counts once when it
    /// appears anywhere in the text, including inside longer words.
    pub fn score(&self, comment: Option<&str>) -> i32 {
        let Some(comment) = comment else {
            return 0;
        };
        let lowered = comment.to_lowercase();
        let hits = |words: &[&str]| words.iter().filter(|word| lowered.contains(**word)).count() as i32;
        hits(self.positive) - hits(self.negative)
    }

    /// Most frequent significant words, ties in first-seen order.
    pub fn keywords<S: AsRef<str>>(&self, comments: &[S], n: usize) -> Vec<String> {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for comment in comments {
            let cleaned: String = comment
                .as_ref()
                .to_lowercase()
                .chars()
                .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
                .collect();

            for token in cleaned.split_whitespace() {
                if token.chars().count() < 3 || self.stopwords.iter().any(|stop| *stop == token) {
                    continue;
                }
                match index.get(token) {
                    Some(&position) => order[position].1 += 1,
                    None => {
                        index.insert(token.to_string(), order.len());
                        order.push((token.to_string(), 1));
                    }
                }
            }
        }

        order.sort_by(|a, b| b.1.cmp(&a.1));
        order.into_iter().take(n).map(|(word, _)| word).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_positive_minus_negative() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.score(Some("Professor ótimo e excelente")), 2);
        assert_eq!(lexicon.score(Some("Sala RUIM, ar quebrado")), -2);
        assert_eq!(lexicon.score(Some("bom mas lento")), 0);
    }

    #[test]
    fn missing_comment_scores_zero() {
        assert_eq!(Lexicon::default().score(None), 0);
    }

    #[test]
    fn matches_keywords_inside_longer_words() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.score(Some("vários problemas no laboratório")), -1);
    }

    #[test]
    fn custom_tables_can_replace_defaults() {
        let lexicon = Lexicon {
            positive: &["great"],
            negative: &["slow"],
            stopwords: &[],
        };
        assert_eq!(lexicon.score(Some("Great staff, slow wifi, great food")), 0);
        assert_eq!(lexicon.score(Some("great")), 1);
    }

    #[test]
    fn extracts_most_frequent_keywords() {
        let comments = ["O sistema é bom e rápido", "Rápido e bom"];
        let keywords = Lexicon::default().keywords(&comments, 2);
        assert_eq!(keywords, vec!["bom".to_string(), "rápido".to_string()]);
    }

    #[test]
    fn keyword_ties_keep_first_seen_order() {
        let comments = ["biblioteca silenciosa, acervo amplo!"];
        let keywords = Lexicon::default().keywords(&comments, 3);
        assert_eq!(keywords, vec!["biblioteca", "silenciosa", "acervo"]);
    }

    #[test]
    fn no_comments_yield_no_keywords() {
        let comments: [&str; 0] = [];
        assert!(Lexicon::default().keywords(&comments, 3).is_empty());
    }
}
