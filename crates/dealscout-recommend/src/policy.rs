//! Multi-criteria scoring and recommendation.
//!
//! Every policy produces a score where lower is better, so recommendation
//! is always "pick the minimum". The weighted and balanced policies rank
//! identically; the balanced form stays within [0, 1] and reads better in
//! diagnostics.

use dealscout_core::ProductRecord;

use crate::RecommendError;

const PRICE_WEIGHT: f64 = 0.6;
const RATING_WEIGHT: f64 = 0.3;
const POPULARITY_WEIGHT: f64 = 0.1;

/// Scoring policy for picking the best candidate. Lower score wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorePolicy {
    /// Signed weighted score: `0.6·price_norm − 0.3·rating_norm −
    /// 0.1·popularity_norm`.
    #[default]
    Weighted,
    /// Bounded [0, 1] variant of [`Self::Weighted`] with identical
    /// ranking: `0.6·price_norm + 0.3·(1−rating_norm) +
    /// 0.1·(1−popularity_norm)`.
    Balanced,
    /// Absolute minimum current price; for deployments where ratings and
    /// review counts carry too little signal to matter.
    LowestPrice,
}

/// Normalized components and final score for one candidate; diagnostics
/// only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub price_norm: f64,
    pub rating_norm: f64,
    pub popularity_norm: f64,
    pub score: f64,
}

impl ScorePolicy {
    /// Picks the candidate with the minimal score under this policy. The
    /// first candidate wins ties.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::EmptyCandidates`] when `candidates` is
    /// empty.
    pub fn recommend<'a>(
        &self,
        candidates: &'a [ProductRecord],
    ) -> Result<&'a ProductRecord, RecommendError> {
        let (max_price, max_reviews) = maxima(candidates);

        let mut best: Option<(&ProductRecord, f64)> = None;
        for candidate in candidates {
            let score = self.breakdown_with(candidate, max_price, max_reviews).score;
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best.map(|(candidate, _)| candidate)
            .ok_or(RecommendError::EmptyCandidates)
    }

    /// Computes the normalized components and final score of `record`
    /// within `candidates` (the set defines the normalization maxima).
    #[must_use]
    pub fn score_breakdown(
        &self,
        record: &ProductRecord,
        candidates: &[ProductRecord],
    ) -> ScoreBreakdown {
        let (max_price, max_reviews) = maxima(candidates);
        self.breakdown_with(record, max_price, max_reviews)
    }

    fn breakdown_with(
        &self,
        record: &ProductRecord,
        max_price: f64,
        max_reviews: u32,
    ) -> ScoreBreakdown {
        let price = record.current_price.unwrap_or(0.0);
        let price_norm = normalize(price, max_price);
        let rating_norm = record.safe_rating() / 5.0;
        let popularity_norm = normalize(f64::from(record.safe_review_count()), f64::from(max_reviews));

        let score = match self {
            ScorePolicy::Weighted => {
                PRICE_WEIGHT * price_norm
                    - RATING_WEIGHT * rating_norm
                    - POPULARITY_WEIGHT * popularity_norm
            }
            ScorePolicy::Balanced => {
                PRICE_WEIGHT * price_norm
                    + RATING_WEIGHT * (1.0 - rating_norm)
                    + POPULARITY_WEIGHT * (1.0 - popularity_norm)
            }
            ScorePolicy::LowestPrice => price,
        };

        ScoreBreakdown {
            price_norm,
            rating_norm,
            popularity_norm,
            score,
        }
    }
}

fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

fn maxima(candidates: &[ProductRecord]) -> (f64, u32) {
    let max_price = candidates
        .iter()
        .filter_map(|c| c.current_price)
        .fold(0.0_f64, f64::max);
    let max_reviews = candidates
        .iter()
        .map(ProductRecord::safe_review_count)
        .max()
        .unwrap_or(0);
    (max_price, max_reviews)
}
