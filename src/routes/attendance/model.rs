use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, QueryBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct Attendance {
    pub id: i32,
    pub user_id: i32,
    pub subject_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
    pub verification_method: String,
    pub liveness_verified: bool,
    pub created_at: DateTime<Utc>,
}

// 报表联查课程信息，供PDF渲染使用
#[derive(Debug, Serialize, FromRow)]
pub struct AttendanceWithSubject {
    pub id: i32,
    pub user_id: i32,
    pub subject_id: i32,
    pub subject_name: String,
    pub subject_code: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: String,
    pub verification_method: String,
    pub liveness_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub subject_id: Option<i32>,
    pub status: Option<String>,
    pub verification_method: Option<String>,
    pub liveness_verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub subject_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub subject_id: Option<i32>,
    pub period: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub attendances: Vec<Attendance>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PdfReportResponse {
    pub filename: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SubjectStats {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub total_classes: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_classes: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub attendance_percentage: f64,
    pub subjects: Vec<SubjectStats>,
}

/// 考勤报表的查询条件，日期区间两端均为闭区间
#[derive(Debug, Clone, Copy)]
pub struct ReportFilter {
    pub user_id: i32,
    pub subject_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn push_report_conditions(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ReportFilter) {
    builder.push_bind(filter.user_id);
    if let Some(subject_id) = filter.subject_id {
        builder.push(" AND a.subject_id = ").push_bind(subject_id);
    }
    if let Some(start) = filter.start_date {
        builder.push(" AND a.date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        builder.push(" AND a.date <= ").push_bind(end);
    }
    builder.push(" ORDER BY a.date DESC, a.time DESC");
}

impl Attendance {
    pub async fn find_for_day(
        pool: &PgPool,
        user_id: i32,
        subject_id: i32,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendances WHERE user_id = $1 AND subject_id = $2 AND date = $3",
        )
        .bind(user_id)
        .bind(subject_id)
        .bind(date)
        .fetch_optional(pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        user_id: i32,
        subject_id: i32,
        status: AttendanceStatus,
        verification_method: &str,
        liveness_verified: bool,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendances (user_id, subject_id, date, time, status, verification_method, liveness_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(subject_id)
        .bind(date)
        .bind(time)
        .bind(status.as_str())
        .bind(verification_method)
        .bind(liveness_verified)
        .fetch_one(pool)
        .await
    }

    pub async fn query_report(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder =
            QueryBuilder::new("SELECT a.* FROM attendances a WHERE a.user_id = ");
        push_report_conditions(&mut builder, filter);
        builder.build_query_as::<Attendance>().fetch_all(pool).await
    }

    pub async fn query_report_with_subjects(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<AttendanceWithSubject>, sqlx::Error> {
        let mut builder = QueryBuilder::new(
            "SELECT a.id, a.user_id, a.subject_id, s.name AS subject_name, s.code AS subject_code, \
             a.date, a.time, a.status, a.verification_method, a.liveness_verified \
             FROM attendances a JOIN subjects s ON s.id = a.subject_id WHERE a.user_id = ",
        );
        push_report_conditions(&mut builder, filter);
        builder
            .build_query_as::<AttendanceWithSubject>()
            .fetch_all(pool)
            .await
    }

    /// 统计用：某用户某课程自start起的全部状态
    pub async fn statuses_since(
        pool: &PgPool,
        user_id: i32,
        subject_id: i32,
        start: NaiveDate,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT status FROM attendances WHERE user_id = $1 AND subject_id = $2 AND date >= $3",
        )
        .bind(user_id)
        .bind(subject_id)
        .bind(start)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        assert_eq!("present".parse(), Ok(AttendanceStatus::Present));
        assert_eq!("absent".parse(), Ok(AttendanceStatus::Absent));
        assert_eq!("late".parse(), Ok(AttendanceStatus::Late));
        assert!("sick".parse::<AttendanceStatus>().is_err());
        assert!("Present".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn report_filter_builds_inclusive_range() {
        let filter = ReportFilter {
            user_id: 7,
            subject_id: Some(3),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31),
        };
        let mut builder =
            QueryBuilder::<sqlx::Postgres>::new("SELECT a.* FROM attendances a WHERE a.user_id = ");
        push_report_conditions(&mut builder, &filter);
        let sql = builder.sql();
        assert!(sql.contains("a.date >= "));
        assert!(sql.contains("a.date <= "));
        assert!(sql.ends_with("ORDER BY a.date DESC, a.time DESC"));
    }

    #[test]
    fn report_filter_omits_absent_conditions() {
        let filter = ReportFilter {
            user_id: 7,
            subject_id: None,
            start_date: None,
            end_date: None,
        };
        let mut builder =
            QueryBuilder::<sqlx::Postgres>::new("SELECT a.* FROM attendances a WHERE a.user_id = ");
        push_report_conditions(&mut builder, &filter);
        let sql = builder.sql();
        assert!(!sql.contains("subject_id"));
        assert!(!sql.contains("a.date >="));
        assert!(!sql.contains("a.date <="));
    }
}
