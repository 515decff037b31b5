//! Calendar-day streaks

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Streak statistics of one habit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakStats {
    /// Consecutive days ending today or yesterday
    pub current_streak: u32,
    /// Longest run of consecutive days
    pub best_streak: u32,
    /// Distinct days with a completion
    pub active_days: u32,
}

/// Distinct UTC calendar days with a completion, ascending
fn distinct_days(completions: &[DateTime<Utc>]) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = completions.iter().map(|ts| ts.date_naive()).collect();
    days.sort();
    days.dedup();
    days
}

/// Calculate streak statistics relative to `today`
///
/// Several completions on one day count once. A streak whose last day is
/// yesterday is still current, so a habit is not penalized before today's
/// window closes. Completions after `today` are ignored.
pub fn calculate_streaks(completions: &[DateTime<Utc>], today: NaiveDate) -> StreakStats {
    let days: Vec<NaiveDate> = distinct_days(completions)
        .into_iter()
        .filter(|day| *day <= today)
        .collect();

    let Some(last_day) = days.last().copied() else {
        return StreakStats::default();
    };

    let mut best_streak = 1u32;
    let mut streak = 1u32;
    for window in days.windows(2) {
        if window[0].checked_add_days(Days::new(1)) == Some(window[1]) {
            streak += 1;
            best_streak = best_streak.max(streak);
        } else {
            streak = 1;
        }
    }

    let yesterday = today.pred_opt().unwrap_or(today);
    let current_streak = if last_day == today || last_day == yesterday {
        // Count backwards from the last day
        let mut current = 1u32;
        for i in (0..days.len() - 1).rev() {
            if days[i].checked_add_days(Days::new(1)) == Some(days[i + 1]) {
                current += 1;
            } else {
                break;
            }
        }
        current
    } else {
        0
    };

    StreakStats {
        current_streak,
        best_streak,
        active_days: days.len() as u32,
    }
}

/// Current streak only
pub fn current_streak(completions: &[DateTime<Utc>], today: NaiveDate) -> u32 {
    calculate_streaks(completions, today).current_streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(calculate_streaks(&[], day(2026, 3, 10)), StreakStats::default());
    }

    #[test]
    fn test_consecutive_days_ending_today() {
        let completions = [at(2026, 3, 8, 7), at(2026, 3, 9, 7), at(2026, 3, 10, 7)];
        let stats = calculate_streaks(&completions, day(2026, 3, 10));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.active_days, 3);
    }

    #[test]
    fn test_yesterday_only_counts() {
        let completions = [at(2026, 3, 9, 22)];
        assert_eq!(current_streak(&completions, day(2026, 3, 10)), 1);
    }

    #[test]
    fn test_same_day_counted_once() {
        let completions = [at(2026, 3, 10, 6), at(2026, 3, 10, 12), at(2026, 3, 10, 20)];
        let stats = calculate_streaks(&completions, day(2026, 3, 10));
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.active_days, 1);
    }

    #[test]
    fn test_gap_breaks_streak() {
        let completions = [
            at(2026, 3, 1, 7),
            at(2026, 3, 2, 7),
            at(2026, 3, 3, 7),
            at(2026, 3, 5, 7),
            at(2026, 3, 6, 7),
        ];
        let stats = calculate_streaks(&completions, day(2026, 3, 6));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.best_streak, 3);
    }

    #[test]
    fn test_stale_streak_is_zero() {
        let completions = [at(2026, 3, 1, 7), at(2026, 3, 2, 7)];
        let stats = calculate_streaks(&completions, day(2026, 3, 10));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 2);
    }

    #[test]
    fn test_month_boundary() {
        let completions = [at(2026, 2, 28, 7), at(2026, 3, 1, 7)];
        assert_eq!(current_streak(&completions, day(2026, 3, 1)), 2);
    }
}
