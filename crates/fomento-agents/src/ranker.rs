//! Opportunity ranker
//!
//! Weighted heuristic scoring of opportunities against a startup profile,
//! optionally blended with vector-similarity scores. A scoring failure for
//! one item substitutes the neutral score and the batch continues.

use std::collections::HashMap;
use std::sync::LazyLock;

use fomento_auth::StartupProfile;
use fomento_common::NEUTRAL_RELEVANCE;
use fomento_opportunity::OpportunityInfo;

// Profile match weights (out of 100)
const CATEGORY_WEIGHT: f64 = 30.0;
const REGION_WEIGHT: f64 = 20.0;
const TRL_WEIGHT: f64 = 25.0;
const AMOUNT_PREFERENCE_WEIGHT: f64 = 15.0;

/// Sources whose opportunities get a credibility bonus
const CREDIBLE_SOURCES: &[&str] = &["finep", "cnpq", "fapesp", "capes", "união europeia"];

/// Weights of the semantic blend: 60% vector similarity, 40% heuristic score
const SEMANTIC_WEIGHT: f64 = 0.6;

static SCORE_PATTERNS: LazyLock<Vec<regex::Regex>> = LazyLock::new(|| {
    [
        r"score[:\s]+(\d+)(?:/100)?",
        r"(\d+)\s*pontos",
        r"(\d+)%",
        r"relevância[:\s]+(\d+)",
    ]
    .iter()
    .map(|p| regex::Regex::new(p).expect("Invalid score pattern"))
    .collect()
});

/// How well an opportunity matches a startup profile, 0..=100
pub fn profile_match(profile: &StartupProfile, opportunity: &OpportunityInfo) -> f64 {
    let mut score = 0.0;

    // Category vs. startup segment
    if let (Some(segment), Some(category)) = (&profile.startup_segment, &opportunity.category)
        && !segment.is_empty()
        && category.to_lowercase().contains(&segment.to_lowercase())
    {
        score += CATEGORY_WEIGHT;
    }

    // Preferred regions
    if let Some(region) = &opportunity.region {
        let region = region.to_lowercase();
        if profile
            .preferred_regions
            .iter()
            .any(|p| !p.trim().is_empty() && region.contains(&p.trim().to_lowercase()))
        {
            score += REGION_WEIGHT;
        }
    }

    // Funding calls here target TRL 4-9
    if let Some(trl) = profile.startup_trl
        && (4..=9).contains(&trl)
    {
        score += TRL_WEIGHT;
    }

    // Having an amount preference at all earns a partial score
    if profile
        .min_amount
        .as_deref()
        .is_some_and(|v| !v.is_empty() && v != "0")
    {
        score += AMOUNT_PREFERENCE_WEIGHT;
    }

    score
}

/// Profile-independent relevance from recency, amount, and source, 0..=100
pub fn base_relevance(opportunity: &OpportunityInfo, now: chrono::NaiveDateTime) -> f64 {
    let mut score = NEUTRAL_RELEVANCE;

    // Recency bonus
    let age = now - opportunity.created_at;
    if age <= chrono::Duration::days(1) {
        score += 20.0;
    } else if age <= chrono::Duration::days(7) {
        score += 10.0;
    }

    // Amount bonus
    if let Some(amount) = &opportunity.amount {
        let amount = amount.to_lowercase();
        if amount.contains("milhão") || amount.contains("million") {
            score += 15.0;
        } else if ["mil", "thousand", "k"].iter().any(|x| amount.contains(x)) {
            score += 10.0;
        }
    }

    // Source credibility
    if let Some(source) = &opportunity.source {
        let source = source.to_lowercase();
        if CREDIBLE_SOURCES.iter().any(|s| source.contains(s)) {
            score += 15.0;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Rank opportunities for a startup profile, highest score first.
/// Without a profile the stored relevance is kept and only the order changes.
pub fn rank(
    mut opportunities: Vec<OpportunityInfo>,
    profile: Option<&StartupProfile>,
) -> Vec<OpportunityInfo> {
    if let Some(profile) = profile {
        let now = chrono::Utc::now().naive_utc();
        for opportunity in &mut opportunities {
            let score =
                (profile_match(profile, opportunity) + base_relevance(opportunity, now)) / 2.0;
            opportunity.relevance_score = if score.is_finite() {
                score
            } else {
                NEUTRAL_RELEVANCE
            };
        }
    }

    sort_by_relevance(&mut opportunities);

    opportunities
}

/// Blend vector-similarity scores (0..=100, keyed by opportunity id) into the
/// heuristic scores and re-sort. Ids without a semantic score are untouched.
pub fn semantic_blend(
    opportunities: &mut Vec<OpportunityInfo>,
    semantic_scores: &HashMap<i64, f64>,
) {
    for opportunity in opportunities.iter_mut() {
        if let Some(semantic) = semantic_scores.get(&opportunity.id) {
            opportunity.relevance_score = semantic * SEMANTIC_WEIGHT
                + opportunity.relevance_score * (1.0 - SEMANTIC_WEIGHT);
        }
    }

    sort_by_relevance(opportunities);
}

/// Extract a numeric score from free text ("score: 85/100", "85 pontos",
/// "85%"), normalizing and falling back to the neutral score.
pub fn parse_score(text: &str) -> f64 {
    let lower = text.to_lowercase();

    for pattern in SCORE_PATTERNS.iter() {
        if let Some(capture) = pattern.captures(&lower)
            && let Some(m) = capture.get(1)
            && let Ok(mut score) = m.as_str().parse::<f64>()
        {
            if score > 100.0 {
                score /= 10.0;
            }
            return score.clamp(0.0, 100.0);
        }
    }

    NEUTRAL_RELEVANCE
}

fn sort_by_relevance(opportunities: &mut [OpportunityInfo]) {
    opportunities.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opportunity(id: i64, category: &str, region: &str, score: f64) -> OpportunityInfo {
        OpportunityInfo {
            id,
            external_id: format!("test_{id}"),
            title: "Edital de teste".to_string(),
            description: None,
            category: Some(category.to_string()),
            kind: Some("edital".to_string()),
            region: Some(region.to_string()),
            deadline: None,
            amount: None,
            source: None,
            source_url: None,
            relevance_score: score,
            tags: vec![],
            is_active: true,
            created_at: chrono::Utc::now().naive_utc() - chrono::Duration::days(30),
            updated_at: chrono::Utc::now().naive_utc(),
            is_favorite: false,
        }
    }

    fn profile() -> StartupProfile {
        StartupProfile {
            startup_segment: Some("Saúde".to_string()),
            startup_trl: Some(6),
            startup_area: None,
            preferred_regions: vec!["Brasil".to_string()],
            preferred_categories: vec!["Saúde".to_string()],
            min_amount: Some("R$ 100.000".to_string()),
        }
    }

    #[test]
    fn test_profile_match_full() {
        let opp = opportunity(1, "Saúde", "Brasil", 0.0);
        assert_eq!(profile_match(&profile(), &opp), 90.0);
    }

    #[test]
    fn test_profile_match_partial() {
        let opp = opportunity(1, "Energia", "Europa", 0.0);
        // Only TRL and amount preference match
        assert_eq!(profile_match(&profile(), &opp), 40.0);
    }

    #[test]
    fn test_profile_match_trl_out_of_range() {
        let mut p = profile();
        p.startup_trl = Some(2);
        let opp = opportunity(1, "Energia", "Europa", 0.0);
        assert_eq!(profile_match(&p, &opp), 15.0);
    }

    #[test]
    fn test_base_relevance_bonuses() {
        let now = chrono::Utc::now().naive_utc();

        let mut opp = opportunity(1, "Saúde", "Brasil", 0.0);
        opp.created_at = now - chrono::Duration::hours(2);
        opp.amount = Some("R$ 2 milhões".to_string());
        opp.source = Some("FINEP".to_string());

        // 50 base + 20 recency + 15 amount + 15 source
        assert_eq!(base_relevance(&opp, now), 100.0);
    }

    #[test]
    fn test_base_relevance_old_and_unknown() {
        let now = chrono::Utc::now().naive_utc();
        let opp = opportunity(1, "Saúde", "Brasil", 0.0);
        assert_eq!(base_relevance(&opp, now), 50.0);
    }

    #[test]
    fn test_rank_without_profile_keeps_scores() {
        let ranked = rank(
            vec![
                opportunity(1, "Saúde", "Brasil", 40.0),
                opportunity(2, "Energia", "Brasil", 80.0),
            ],
            None,
        );

        assert_eq!(ranked[0].id, 2);
        assert_eq!(ranked[0].relevance_score, 80.0);
        assert_eq!(ranked[1].relevance_score, 40.0);
    }

    #[test]
    fn test_rank_with_profile_orders_by_match() {
        let ranked = rank(
            vec![
                opportunity(1, "Energia", "Europa", 50.0),
                opportunity(2, "Saúde", "Brasil", 50.0),
            ],
            Some(&profile()),
        );

        assert_eq!(ranked[0].id, 2);
        assert!(ranked[0].relevance_score > ranked[1].relevance_score);
    }

    #[test]
    fn test_semantic_blend() {
        let mut opportunities = vec![
            opportunity(1, "Saúde", "Brasil", 80.0),
            opportunity(2, "Energia", "Brasil", 70.0),
        ];

        let semantic_scores = HashMap::from([(2, 100.0)]);
        semantic_blend(&mut opportunities, &semantic_scores);

        // 0.6 * 100 + 0.4 * 70 = 88 beats the untouched 80
        assert_eq!(opportunities[0].id, 2);
        assert_eq!(opportunities[0].relevance_score, 88.0);
        assert_eq!(opportunities[1].relevance_score, 80.0);
    }

    #[test]
    fn test_parse_score_patterns() {
        assert_eq!(parse_score("Score: 85/100 pela compatibilidade"), 85.0);
        assert_eq!(parse_score("a oportunidade recebe 72 pontos"), 72.0);
        assert_eq!(parse_score("compatibilidade de 64%"), 64.0);
        assert_eq!(parse_score("relevância: 91"), 91.0);
        assert_eq!(parse_score("sem número aqui"), 50.0);
        // Out-of-scale values are normalized
        assert_eq!(parse_score("score: 850"), 85.0);
    }
}
