//! Plain-text diagnostics for a recommendation.

use std::fmt::Write;

use dealscout_core::ProductRecord;

use crate::policy::ScorePolicy;
use crate::RecommendError;

/// Renders a text report for the best pick under `policy`: the winner with
/// its normalized score components, followed by every candidate sorted
/// ascending by price.
///
/// # Errors
///
/// Returns [`RecommendError::EmptyCandidates`] when `candidates` is empty.
pub fn recommendation_report(
    policy: ScorePolicy,
    candidates: &[ProductRecord],
) -> Result<String, RecommendError> {
    let best = policy.recommend(candidates)?;
    let breakdown = policy.score_breakdown(best, candidates);

    let mut out = String::new();

    let _ = writeln!(out, "RECOMMENDED OPTION");
    let _ = writeln!(out, "------------------------------------------");
    let _ = writeln!(out, "store:  {}", best.store_name);
    let _ = writeln!(out, "name:   {}", best.name);
    let _ = writeln!(out, "price:  {}", best.formatted_price());
    if best.rating.is_some() {
        let _ = writeln!(
            out,
            "rating: {:.1}/5 ({} reviews)",
            best.safe_rating(),
            best.safe_review_count()
        );
    }
    let _ = writeln!(out, "link:   {}", best.product_url);

    let _ = writeln!(out);
    let _ = writeln!(out, "SCORE ANALYSIS");
    let _ = writeln!(out, "price component:      {:.3}", breakdown.price_norm);
    let _ = writeln!(out, "rating component:     {:.3}", breakdown.rating_norm);
    let _ = writeln!(out, "popularity component: {:.3}", breakdown.popularity_norm);
    let _ = writeln!(out, "final score:          {:.3}", breakdown.score);

    let _ = writeln!(out);
    let _ = writeln!(out, "PRICE COMPARISON");
    let _ = writeln!(
        out,
        "{:<15} | {:<12} | {:<10} | {}",
        "STORE", "PRICE", "RATING", "AVAILABLE"
    );
    let _ = writeln!(out, "-----------------------------------------------------");

    let mut sorted: Vec<&ProductRecord> = candidates.iter().collect();
    sorted.sort_by(|a, b| {
        a.current_price
            .unwrap_or(0.0)
            .total_cmp(&b.current_price.unwrap_or(0.0))
    });

    for record in sorted {
        let rating = match record.rating {
            Some(r) => format!("{r:.1}/5"),
            None => "N/A".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<15} | {:<12} | {:<10} | {}",
            record.store_name,
            record.formatted_price(),
            rating,
            if record.available { "yes" } else { "no" }
        );
    }

    Ok(out)
}
