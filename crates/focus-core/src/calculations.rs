//! Small derived figures shown next to the usage tables.

use chrono::NaiveDate;

use crate::models::AppUsageSummary;

/// Hours in the day ring.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Fraction of the day ring filled by `hours_used`, in `[0.0, 1.0]`.
pub fn usage_progress(hours_used: f64) -> f64 {
    if hours_used.is_nan() {
        return 0.0;
    }
    hours_used.clamp(0.0, HOURS_PER_DAY) / HOURS_PER_DAY
}

/// Seconds `summary` recorded on `date`, `0` if none.
pub fn usage_on(summary: &AppUsageSummary, date: NaiveDate) -> u64 {
    summary
        .daily_usage
        .iter()
        .find(|d| d.date == date)
        .map(|d| d.duration_secs)
        .unwrap_or(0)
}

/// Hours used across all `summaries` on `date`.
pub fn hours_used_on(summaries: &[AppUsageSummary], date: NaiveDate) -> f64 {
    let secs: u64 = summaries.iter().map(|s| usage_on(s, date)).sum();
    secs as f64 / 3600.0
}

/// Where an app stands against its daily limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStatus {
    /// No limit configured (absent or zero).
    NoLimit,
    Within { remaining_secs: u64 },
    Exceeded { over_secs: u64 },
}

/// Compare `used_secs` against a limit expressed in minutes.
pub fn daily_limit_status(used_secs: u64, limit_minutes: Option<u32>) -> LimitStatus {
    match limit_minutes {
        None | Some(0) => LimitStatus::NoLimit,
        Some(minutes) => {
            let limit_secs = u64::from(minutes) * 60;
            if used_secs > limit_secs {
                LimitStatus::Exceeded {
                    over_secs: used_secs - limit_secs,
                }
            } else {
                LimitStatus::Within {
                    remaining_secs: limit_secs - used_secs,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyUsage;

    fn summary(days: &[(u32, u64)]) -> AppUsageSummary {
        let daily_usage: Vec<DailyUsage> = days
            .iter()
            .map(|&(d, secs)| DailyUsage {
                date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
                duration_secs: secs,
            })
            .collect();
        let total_secs = daily_usage.iter().map(|d| d.duration_secs).sum();
        AppUsageSummary {
            package_name: "com.example".to_string(),
            app_name: "Example".to_string(),
            version_name: "1.0".to_string(),
            icon: None,
            first_install_time: String::new(),
            last_update_time: String::new(),
            last_used_time: String::new(),
            last_used: None,
            daily_usage,
            total_secs,
        }
    }

    #[test]
    fn test_usage_progress_clamps() {
        assert_eq!(usage_progress(-3.0), 0.0);
        assert_eq!(usage_progress(0.0), 0.0);
        assert!((usage_progress(6.0) - 0.25).abs() < 1e-9);
        assert_eq!(usage_progress(24.0), 1.0);
        assert_eq!(usage_progress(30.0), 1.0);
        assert_eq!(usage_progress(f64::NAN), 0.0);
    }

    #[test]
    fn test_usage_on() {
        let s = summary(&[(1, 100), (2, 200)]);
        assert_eq!(usage_on(&s, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), 200);
        assert_eq!(usage_on(&s, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()), 0);
    }

    #[test]
    fn test_hours_used_on_sums_apps() {
        let apps = vec![summary(&[(1, 3600)]), summary(&[(1, 1800), (2, 60)])];
        let h = hours_used_on(&apps, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!((h - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_daily_limit_status() {
        assert_eq!(daily_limit_status(500, None), LimitStatus::NoLimit);
        assert_eq!(daily_limit_status(500, Some(0)), LimitStatus::NoLimit);
        assert_eq!(
            daily_limit_status(600, Some(30)),
            LimitStatus::Within { remaining_secs: 1200 }
        );
        assert_eq!(
            daily_limit_status(1800, Some(30)),
            LimitStatus::Within { remaining_secs: 0 }
        );
        assert_eq!(
            daily_limit_status(1900, Some(30)),
            LimitStatus::Exceeded { over_secs: 100 }
        );
    }
}
