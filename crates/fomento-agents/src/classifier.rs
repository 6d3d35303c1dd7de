//! Opportunity classifier
//!
//! Keyword-containment scoring over title + description. Categories and kinds
//! come from fixed vocabularies; an item with no keyword hits keeps whatever
//! the source declared and falls back to the neutral defaults.

use std::sync::LazyLock;

use fomento_common::{CATEGORY_GERAL, KIND_EDITAL, NEUTRAL_RELEVANCE};
use fomento_opportunity::NewOpportunity;

use crate::model::RawOpportunity;

/// Relevance assigned when the funding vocabulary matches
const KEYWORD_RELEVANCE: f64 = 70.0;

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Inteligência Artificial",
        &["ia", "artificial intelligence", "machine learning", "deep learning", "ai"],
    ),
    (
        "Saúde",
        &["saúde", "health", "medicina", "medical", "biotecnologia", "biotech"],
    ),
    (
        "Energia",
        &["energia", "energy", "sustentabilidade", "renewable", "solar", "eólica"],
    ),
    (
        "Fintech",
        &["fintech", "financeiro", "financial", "blockchain", "crypto"],
    ),
    (
        "Agtech",
        &["agtech", "agricultura", "agriculture", "agronegócio", "farming"],
    ),
    (
        "Educação",
        &["educação", "education", "edtech", "ensino", "learning"],
    ),
    (
        "Mobilidade",
        &["mobilidade", "mobility", "transporte", "transport", "logística"],
    ),
    (
        "Indústria 4.0",
        &["indústria", "industry", "manufatura", "iot", "automação"],
    ),
];

const KIND_KEYWORDS: &[(&str, &[&str])] = &[
    ("edital", &["edital", "chamada pública", "concurso", "seleção pública"]),
    ("bolsa", &["bolsa", "scholarship", "fellowship", "auxílio"]),
    (
        "investimento",
        &["investimento", "investment", "funding", "capital", "venture"],
    ),
];

const FUNDING_KEYWORDS: &[&str] = &[
    "financiamento",
    "bolsa",
    "edital",
    "investimento",
    "startup",
    "inovação",
    "pesquisa",
    "desenvolvimento",
    "tecnologia",
    "ciência",
    "empreendedorismo",
];

static AMOUNT_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"r\$\s*[\d.,]+").expect("Invalid amount pattern"));

static DATE_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("Invalid date pattern"));

/// Keywords, amounts, and dates found in a text
#[derive(Debug, Clone, Default)]
pub struct KeywordExtraction {
    pub keywords: Vec<String>,
    pub amounts: Vec<String>,
    pub dates: Vec<String>,
}

fn best_match(
    text: &str,
    table: &'static [(&'static str, &'static [&'static str])],
) -> Option<&'static str> {
    let mut best: Option<&str> = None;
    let mut best_score = 0usize;

    for (label, keywords) in table {
        let score = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if score > best_score {
            best_score = score;
            best = Some(label);
        }
    }

    best
}

/// Classify a text into a category and a kind
pub fn classify_text(text: &str) -> (Option<&'static str>, Option<&'static str>) {
    let lower = text.to_lowercase();

    (
        best_match(&lower, CATEGORY_KEYWORDS),
        best_match(&lower, KIND_KEYWORDS),
    )
}

/// Extract the funding vocabulary hits, amounts, and dates from a text
pub fn extract_keywords(text: &str) -> KeywordExtraction {
    let lower = text.to_lowercase();

    KeywordExtraction {
        keywords: FUNDING_KEYWORDS
            .iter()
            .filter(|kw| lower.contains(*kw))
            .map(|kw| kw.to_string())
            .collect(),
        amounts: AMOUNT_PATTERN
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect(),
        dates: DATE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

/// Classify a collected opportunity
pub fn classify(raw: RawOpportunity) -> NewOpportunity {
    let text = format!(
        "{} {}",
        raw.title,
        raw.description.as_deref().unwrap_or_default()
    );

    let (category, kind) = classify_text(&text);
    let extraction = extract_keywords(&text);

    let category = category
        .map(str::to_string)
        .or(raw.category)
        .unwrap_or_else(|| CATEGORY_GERAL.to_string());
    let kind = kind
        .map(str::to_string)
        .or(raw.kind)
        .unwrap_or_else(|| KIND_EDITAL.to_string());

    let relevance_score = if extraction.keywords.is_empty() {
        NEUTRAL_RELEVANCE
    } else {
        KEYWORD_RELEVANCE
    };

    let tags = if extraction.keywords.is_empty() {
        raw.tags
    } else {
        extraction.keywords.into_iter().take(5).collect()
    };

    NewOpportunity {
        external_id: raw.external_id,
        title: raw.title,
        description: raw.description,
        category: Some(category),
        kind: Some(kind),
        region: raw.region,
        deadline: raw.deadline,
        amount: raw.amount,
        source: raw.source,
        source_url: raw.source_url,
        relevance_score,
        tags,
    }
}

/// Classify a whole batch; classification never drops an item
pub fn classify_batch(batch: Vec<RawOpportunity>) -> Vec<NewOpportunity> {
    tracing::info!("Classifying {} opportunities", batch.len());
    batch.into_iter().map(classify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, description: &str) -> RawOpportunity {
        RawOpportunity {
            external_id: "test_001".to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_text_category_and_kind() {
        let (category, kind) =
            classify_text("Edital de machine learning e deep learning para startups de IA");
        assert_eq!(category, Some("Inteligência Artificial"));
        assert_eq!(kind, Some("edital"));

        let (category, kind) = classify_text("Bolsa de biotecnologia em saúde");
        assert_eq!(category, Some("Saúde"));
        assert_eq!(kind, Some("bolsa"));
    }

    #[test]
    fn test_classify_text_no_match() {
        let (category, kind) = classify_text("assunto completamente diferente");
        assert_eq!(category, None);
        assert_eq!(kind, None);
    }

    #[test]
    fn test_extract_keywords() {
        let extraction = extract_keywords(
            "Financiamento de pesquisa em tecnologia, até R$ 250.000,00, prazo 15/03/2024",
        );

        assert!(extraction.keywords.contains(&"financiamento".to_string()));
        assert!(extraction.keywords.contains(&"pesquisa".to_string()));
        assert_eq!(extraction.amounts, vec!["r$ 250.000,00".to_string()]);
        assert_eq!(extraction.dates, vec!["15/03/2024".to_string()]);
    }

    #[test]
    fn test_classify_assigns_relevance() {
        let classified = classify(raw(
            "Edital de inovação para startups",
            "Financiamento de tecnologia",
        ));
        assert_eq!(classified.relevance_score, 70.0);
        assert_eq!(classified.kind.as_deref(), Some("edital"));
        assert!(!classified.tags.is_empty());
    }

    #[test]
    fn test_classify_neutral_fallback() {
        let classified = classify(raw("Aviso geral", "sem conteúdo relacionado"));
        assert_eq!(classified.relevance_score, 50.0);
        assert_eq!(classified.category.as_deref(), Some("Geral"));
        assert_eq!(classified.kind.as_deref(), Some("edital"));
    }

    #[test]
    fn test_classify_keeps_source_category_when_undecided() {
        let mut item = raw("Aviso geral", "sem conteúdo relacionado");
        item.category = Some("Energia".to_string());

        let classified = classify(item);
        assert_eq!(classified.category.as_deref(), Some("Energia"));
    }
}
