use crate::error::{Result, TitleOddsError};
use crate::models::{TeamSeasonInput, SEASON_MATCHES};

/// Check that wins + draws + losses add up to a full season.
/// Returns the total on success so callers can display it.
pub fn validate_match_count(wins: u32, draws: u32, losses: u32) -> Result<u64> {
    let total = u64::from(wins) + u64::from(draws) + u64::from(losses);
    if total != SEASON_MATCHES {
        return Err(TitleOddsError::InvalidMatchCount {
            total,
            expected: SEASON_MATCHES,
        });
    }
    Ok(total)
}

impl TeamSeasonInput {
    pub fn validate(&self) -> Result<u64> {
        validate_match_count(self.wins, self.draws, self.losses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_full_season_split_is_valid() {
        for wins in 0..=38u32 {
            for draws in 0..=(38 - wins) {
                let losses = 38 - wins - draws;
                assert_eq!(validate_match_count(wins, draws, losses).unwrap(), 38);
            }
        }
    }

    #[test]
    fn test_wrong_totals_report_the_sum() {
        for (w, d, l) in [(0, 0, 0), (30, 5, 2), (30, 5, 4), (38, 38, 38), (20, 0, 0)] {
            match validate_match_count(w, d, l) {
                Err(TitleOddsError::InvalidMatchCount { total, expected }) => {
                    assert_eq!(total, u64::from(w + d + l));
                    assert_eq!(expected, 38);
                }
                other => panic!("expected InvalidMatchCount, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let err = validate_match_count(u32::MAX, u32::MAX, 1).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("8589934591"));
    }

    #[test]
    fn test_input_validate_delegates() {
        assert!(TeamSeasonInput::new(30, 5, 3, 90, 25).validate().is_ok());
        assert!(TeamSeasonInput::new(30, 5, 4, 90, 25).validate().is_err());
    }
}
