use crate::session::RoundOutcome;
use itertools::Itertools;

/// Aggregate statistics for a finished (or in-progress) session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub total_rounds: usize,
    pub correct: usize,
    /// Rounded to the nearest whole percent; 0 for an empty session.
    pub accuracy_percent: u32,
    /// Longest run of consecutive correct rounds, trailing run included.
    pub longest_streak: usize,
}

impl SessionSummary {
    pub fn from_outcomes(outcomes: &[RoundOutcome]) -> Self {
        let total_rounds = outcomes.len();
        let correct = outcomes.iter().filter(|o| o.correct).count();

        let accuracy_percent = if total_rounds == 0 {
            0
        } else {
            (100.0 * correct as f64 / total_rounds as f64).round() as u32
        };

        let runs = outcomes.iter().chunk_by(|o| o.correct);
        let longest_streak = runs
            .into_iter()
            .filter_map(|(is_correct, run)| is_correct.then(|| run.count()))
            .max()
            .unwrap_or(0);

        Self {
            total_rounds,
            correct,
            accuracy_percent,
            longest_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(flags: &[bool]) -> Vec<RoundOutcome> {
        flags
            .iter()
            .map(|&correct| RoundOutcome {
                target: "1234".into(),
                submitted: if correct { "1234".into() } else { "9999".into() },
                correct,
            })
            .collect()
    }

    #[test]
    fn test_empty_session_is_all_zeros() {
        let summary = SessionSummary::from_outcomes(&[]);
        assert_eq!(summary, SessionSummary::default());
    }

    #[test]
    fn test_mixed_session_scenario() {
        // T T F T T T F
        let list = outcomes(&[true, true, false, true, true, true, false]);
        let summary = SessionSummary::from_outcomes(&list);

        assert_eq!(summary.total_rounds, 7);
        assert_eq!(summary.correct, 5);
        assert_eq!(summary.accuracy_percent, 71);
        assert_eq!(summary.longest_streak, 3);
    }

    #[test]
    fn test_trailing_streak_counts() {
        let list = outcomes(&[false, true, true, true]);
        let summary = SessionSummary::from_outcomes(&list);
        assert_eq!(summary.longest_streak, 3);
    }

    #[test]
    fn test_all_incorrect_has_zero_streak() {
        for len in 1..=8 {
            let list = outcomes(&vec![false; len]);
            let summary = SessionSummary::from_outcomes(&list);
            assert_eq!(summary.longest_streak, 0);
            assert_eq!(summary.accuracy_percent, 0);
        }
    }

    #[test]
    fn test_all_correct() {
        let list = outcomes(&[true; 5]);
        let summary = SessionSummary::from_outcomes(&list);
        assert_eq!(summary.correct, 5);
        assert_eq!(summary.accuracy_percent, 100);
        assert_eq!(summary.longest_streak, 5);
    }

    #[test]
    fn test_accuracy_rounds_to_nearest() {
        // 1/3 = 33.33 -> 33, 2/3 = 66.67 -> 67
        let third = SessionSummary::from_outcomes(&outcomes(&[true, false, false]));
        assert_eq!(third.accuracy_percent, 33);
        let two_thirds = SessionSummary::from_outcomes(&outcomes(&[true, true, false]));
        assert_eq!(two_thirds.accuracy_percent, 67);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let list = outcomes(&[true, false, true, true]);
        let a = SessionSummary::from_outcomes(&list);
        let b = SessionSummary::from_outcomes(&list);
        assert_eq!(a, b);
        assert!(a.correct <= a.total_rounds);
        assert!(a.accuracy_percent <= 100);
    }
}
