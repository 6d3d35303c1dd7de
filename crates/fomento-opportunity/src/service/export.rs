//! CSV export of opportunity listings

use crate::model::OpportunityInfo;

const HEADERS: &[&str] = &[
    "external_id",
    "title",
    "category",
    "type",
    "region",
    "deadline",
    "amount",
    "source",
    "source_url",
    "relevance_score",
];

/// Render opportunities as a CSV document
pub fn to_csv(rows: &[OpportunityInfo]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    for row in rows {
        let deadline = row
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let score = format!("{:.1}", row.relevance_score);

        writer.write_record([
            row.external_id.as_str(),
            row.title.as_str(),
            row.category.as_deref().unwrap_or(""),
            row.kind.as_deref().unwrap_or(""),
            row.region.as_deref().unwrap_or(""),
            deadline.as_str(),
            row.amount.as_deref().unwrap_or(""),
            row.source.as_deref().unwrap_or(""),
            row.source_url.as_deref().unwrap_or(""),
            score.as_str(),
        ])?;
    }

    let bytes = writer.into_inner()?;

    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, score: f64) -> OpportunityInfo {
        OpportunityInfo {
            id: 1,
            external_id: "finep_2024_001".to_string(),
            title: title.to_string(),
            description: None,
            category: Some("Inteligência Artificial".to_string()),
            kind: Some("edital".to_string()),
            region: Some("Brasil".to_string()),
            deadline: chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            amount: Some("R$ 500.000".to_string()),
            source: Some("FINEP".to_string()),
            source_url: None,
            relevance_score: score,
            tags: vec![],
            is_active: true,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_to_csv() {
        let csv = to_csv(&[sample("Subvenção Econômica", 95.0)]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap().split(',').count(), HEADERS.len());
        let row = lines.next().unwrap();
        assert!(row.contains("Subvenção Econômica"));
        assert!(row.contains("2024-03-15"));
        assert!(row.contains("95.0"));
    }

    #[test]
    fn test_to_csv_quotes_embedded_commas() {
        let mut info = sample("Edital, com vírgula", 50.0);
        info.amount = Some("R$ 1.000,00".to_string());

        let csv = to_csv(&[info]).unwrap();
        assert!(csv.contains("\"Edital, com vírgula\""));
    }
}
