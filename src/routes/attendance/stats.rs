// 考勤统计的纯计算部分：统计周期、按状态计数、出勤率

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Semester,
    Year,
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "semester" => Ok(Period::Semester),
            "year" => Ok(Period::Year),
            _ => Err(()),
        }
    }
}

/// 统计窗口的起始日（含当日）
pub fn period_start(today: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Week => today
            .checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64))
            .unwrap_or(today),
        Period::Month => today.with_day(1).unwrap_or(today),
        Period::Semester => {
            // 学期按1-6月、7-12月划分
            let month = if today.month() <= 6 { 1 } else { 7 };
            NaiveDate::from_ymd_opt(today.year(), month, 1).unwrap_or(today)
        }
        Period::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

pub fn count_statuses<'a>(statuses: impl IntoIterator<Item = &'a str>) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for status in statuses {
        counts.total += 1;
        match status {
            "present" => counts.present += 1,
            "absent" => counts.absent += 1,
            "late" => counts.late += 1,
            _ => {}
        }
    }
    counts
}

/// 出勤率 = (present + late) / total * 100，保留两位小数；无记录时为0
pub fn attendance_percentage(counts: StatusCounts) -> f64 {
    if counts.total <= 0 {
        return 0.0;
    }
    let raw = (counts.present + counts.late) as f64 / counts.total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-08-28 是周五
        assert_eq!(period_start(day(2026, 8, 28), Period::Week), day(2026, 8, 24));
        // 周一取当日
        assert_eq!(period_start(day(2026, 8, 24), Period::Week), day(2026, 8, 24));
    }

    #[test]
    fn month_starts_on_first_day() {
        assert_eq!(period_start(day(2026, 8, 28), Period::Month), day(2026, 8, 1));
        assert_eq!(period_start(day(2026, 2, 1), Period::Month), day(2026, 2, 1));
    }

    #[test]
    fn semester_splits_at_july() {
        assert_eq!(period_start(day(2026, 6, 30), Period::Semester), day(2026, 1, 1));
        assert_eq!(period_start(day(2026, 7, 1), Period::Semester), day(2026, 7, 1));
        assert_eq!(period_start(day(2026, 12, 31), Period::Semester), day(2026, 7, 1));
    }

    #[test]
    fn year_starts_in_january() {
        assert_eq!(period_start(day(2026, 8, 28), Period::Year), day(2026, 1, 1));
    }

    #[test]
    fn unknown_period_is_rejected() {
        assert!("quarter".parse::<Period>().is_err());
        assert_eq!("semester".parse::<Period>(), Ok(Period::Semester));
    }

    #[test]
    fn counting_ignores_unknown_status() {
        let counts = count_statuses(["present", "late", "absent", "present", "excused"]);
        assert_eq!(
            counts,
            StatusCounts {
                total: 5,
                present: 2,
                absent: 1,
                late: 1,
            }
        );
    }

    #[test]
    fn percentage_counts_late_as_attended() {
        let counts = StatusCounts {
            total: 3,
            present: 1,
            absent: 1,
            late: 1,
        };
        assert!((attendance_percentage(counts) - 66.67).abs() < 1e-9);
    }

    #[test]
    fn percentage_is_zero_without_records() {
        assert_eq!(attendance_percentage(StatusCounts::default()), 0.0);
    }

    #[test]
    fn percentage_full_attendance() {
        let counts = StatusCounts {
            total: 10,
            present: 9,
            absent: 0,
            late: 1,
        };
        assert_eq!(attendance_percentage(counts), 100.0);
    }
}
