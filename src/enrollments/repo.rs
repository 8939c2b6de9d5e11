use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Entitlement record: one row per (user, course), enforced by the
/// primary key. Progress is a percentage in 0..=100.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub progress: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Enrollment {
    /// Idempotent enroll. The ON CONFLICT no-op update makes concurrent
    /// duplicate calls converge on the existing row and return it
    /// unchanged; there is no read-then-insert window.
    pub async fn upsert(db: &PgPool, user_id: Uuid, course_id: Uuid) -> anyhow::Result<Enrollment> {
        let row = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id)
                DO UPDATE SET progress = enrollments.progress
            RETURNING user_id, course_id, progress, created_at
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// None means "not enrolled", an expected outcome rather than an error.
    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> anyhow::Result<Option<Enrollment>> {
        let row = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT user_id, course_id, progress, created_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Overwrite progress for an existing row; last write wins. Returns
    /// None when the pair was never enrolled.
    pub async fn set_progress(
        db: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        progress: i32,
    ) -> anyhow::Result<Option<Enrollment>> {
        let row = sqlx::query_as::<_, Enrollment>(
            r#"
            UPDATE enrollments
            SET progress = $3
            WHERE user_id = $1 AND course_id = $2
            RETURNING user_id, course_id, progress, created_at
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(progress)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}
