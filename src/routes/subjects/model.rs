use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, QueryBuilder};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<i32>,
    pub schedule_days: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<i32>,
    pub schedule_days: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub teacher_id: Option<i32>,
    pub schedule_days: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl UpdateSubjectRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.description.is_none()
            && self.teacher_id.is_none()
            && self.schedule_days.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

impl Subject {
    pub async fn create(pool: &PgPool, req: CreateSubjectRequest) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subject>(
            r#"
            INSERT INTO subjects (name, code, description, teacher_id, schedule_days, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.code)
        .bind(&req.description)
        .bind(req.teacher_id)
        .bind(&req.schedule_days)
        .bind(req.start_time)
        .bind(req.end_time)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, subject_id: i32) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = $1")
            .bind(subject_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subject>("SELECT * FROM subjects ORDER BY code")
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        subject_id: i32,
        req: UpdateSubjectRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::new("UPDATE subjects SET updated_at = now()");
        if let Some(name) = &req.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(code) = &req.code {
            builder.push(", code = ").push_bind(code);
        }
        if let Some(description) = &req.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(teacher_id) = req.teacher_id {
            builder.push(", teacher_id = ").push_bind(teacher_id);
        }
        if let Some(schedule_days) = &req.schedule_days {
            builder.push(", schedule_days = ").push_bind(schedule_days);
        }
        if let Some(start_time) = req.start_time {
            builder.push(", start_time = ").push_bind(start_time);
        }
        if let Some(end_time) = req.end_time {
            builder.push(", end_time = ").push_bind(end_time);
        }
        builder.push(" WHERE id = ").push_bind(subject_id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<Subject>()
            .fetch_optional(pool)
            .await
    }
}
