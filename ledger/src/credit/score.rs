//! Band scoring of a volume breakdown.
//!
//! Each percentage is matched against the band centers `100, 90, …, 10`
//! with a tolerance of ±9.9. The tolerance is wider than the spacing, so a
//! value can sit in two bands; the later (lower) center wins. A value that
//! matches no band scores zero on that half.
//!
//! | band idx | center | borrow score | lend score |
//! |----------|--------|--------------|------------|
//! | 0        | 100    | 100          | 2000       |
//! | 1        | 90     | 200          | 1900       |
//! | …        | …      | …            | …          |
//! | 9        | 10     | 1000         | 1100       |

use serde::{Deserialize, Serialize};

use super::aggregate::VolumeBreakdown;
use crate::config::{
    BAND_CENTERS, BAND_TOLERANCE, BORROW_SCORE_STEP, LEND_SCORE_BASE, LEND_SCORE_STEP,
};

/// Both halves of a score and their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScore {
    pub borrow_score: u32,
    pub lend_score: u32,
    pub total: u32,
}

/// Converts percentages into a [`CreditScore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scorer {
    bands: [f64; 10],
    tolerance: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            bands: BAND_CENTERS,
            tolerance: BAND_TOLERANCE,
        }
    }
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the last band whose center lies within tolerance of `pct`.
    fn matching_band(&self, pct: f64) -> Option<u32> {
        let mut matched = None;
        for (idx, center) in self.bands.iter().enumerate() {
            if (center - pct).abs() <= self.tolerance {
                matched = Some(idx as u32);
            }
        }
        matched
    }

    pub fn borrow_score(&self, pct_borrowed: f64) -> u32 {
        self.matching_band(pct_borrowed)
            .map_or(0, |idx| BORROW_SCORE_STEP * (idx + 1))
    }

    pub fn lend_score(&self, pct_lent: f64) -> u32 {
        self.matching_band(pct_lent)
            .map_or(0, |idx| LEND_SCORE_BASE - idx * LEND_SCORE_STEP)
    }

    pub fn score_percentages(&self, pct_borrowed: f64, pct_lent: f64) -> CreditScore {
        let borrow_score = self.borrow_score(pct_borrowed);
        let lend_score = self.lend_score(pct_lent);
        CreditScore {
            borrow_score,
            lend_score,
            total: borrow_score + lend_score,
        }
    }

    pub fn score(&self, volume: &VolumeBreakdown) -> CreditScore {
        self.score_percentages(volume.pct_borrowed, volume.pct_lent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_seventy_scores_2500() {
        let score = Scorer::new().score_percentages(30.0, 70.0);
        assert_eq!(score.borrow_score, 800);
        assert_eq!(score.lend_score, 1700);
        assert_eq!(score.total, 2500);
    }

    #[test]
    fn overlapping_bands_take_the_lower_center() {
        // 35 is within 9.9 of both 40 (idx 6) and 30 (idx 7).
        let scorer = Scorer::new();
        assert_eq!(scorer.borrow_score(35.0), 800);
        // 65 is within 9.9 of both 70 (idx 3) and 60 (idx 4).
        assert_eq!(scorer.lend_score(65.0), 1600);
        assert_eq!(scorer.score_percentages(35.0, 65.0).total, 2400);
    }

    #[test]
    fn even_split() {
        let score = Scorer::new().score_percentages(50.0, 50.0);
        assert_eq!(score.borrow_score, 600);
        assert_eq!(score.lend_score, 1500);
        assert_eq!(score.total, 2100);
    }

    #[test]
    fn extremes() {
        let scorer = Scorer::new();
        let all_borrow = scorer.score_percentages(100.0, 0.0);
        assert_eq!(all_borrow.borrow_score, 100);
        assert_eq!(all_borrow.lend_score, 0);
        assert_eq!(all_borrow.total, 100);

        let all_lend = scorer.score_percentages(0.0, 100.0);
        assert_eq!(all_lend.borrow_score, 0);
        assert_eq!(all_lend.lend_score, 2000);
        assert_eq!(all_lend.total, 2000);
    }

    #[test]
    fn out_of_range_scores_zero() {
        let scorer = Scorer::new();
        assert_eq!(scorer.borrow_score(-5.0), 0);
        assert_eq!(scorer.lend_score(150.0), 0);
    }

    #[test]
    fn scale_boundaries() {
        let scorer = Scorer::new();
        assert_eq!(scorer.borrow_score(10.0), 1000);
        assert_eq!(scorer.lend_score(10.0), 1100);
        assert_eq!(scorer.lend_score(90.0), 1900);
    }

    #[test]
    fn tolerance_edges_as_evaluated_in_f64() {
        // (pct, borrow score, lend score)
        let cases = [
            (100.0, 100, 2000),
            (90.1, 200, 1900), // 100 - 90.1 is just over 9.9
            (89.9, 200, 1900),
            (79.9, 300, 1800), // 79.9 - 70 is just over 9.9
            (79.8, 400, 1700), // in both 80 and 70, the later wins
            (20.1, 900, 1200),
            (19.9, 1000, 1100),
            (10.1, 1000, 1100),
            (9.9, 1000, 1100),
            (0.1, 1000, 1100), // 10 - 0.1 is exactly 9.9
            (0.0, 0, 0),
        ];
        let scorer = Scorer::new();
        for (pct, borrow, lend) in cases {
            assert_eq!(scorer.borrow_score(pct), borrow, "borrow_score({pct})");
            assert_eq!(scorer.lend_score(pct), lend, "lend_score({pct})");
        }
    }

    #[test]
    fn scores_from_breakdown() {
        let volume = VolumeBreakdown {
            borrow_sum: 300.0,
            lend_sum: -700.0,
            total_volume: 1000.0,
            pct_borrowed: 30.0,
            pct_lent: 70.0,
        };
        assert_eq!(Scorer::new().score(&volume).total, 2500);
    }
}
