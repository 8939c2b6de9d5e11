use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lesson record. `position` is unique within a course and defines the
/// display and sequential-playback order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: i32,
    pub duration_seconds: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Lesson {
    /// All lessons of a course, position ascending. Metadata is not
    /// access-gated; entitlement only decides whether media is playable.
    pub async fn list_by_course(db: &PgPool, course_id: Uuid) -> anyhow::Result<Vec<Lesson>> {
        let rows = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, course_id, title, description, video_url,
                   position, duration_seconds, created_at
            FROM lessons
            WHERE course_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, course_id, title, description, video_url,
                   position, duration_seconds, created_at
            FROM lessons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(lesson)
    }

    pub async fn create(
        db: &PgPool,
        course_id: Uuid,
        title: &str,
        description: Option<&str>,
        video_url: Option<&str>,
        position: i32,
        duration_seconds: i32,
    ) -> anyhow::Result<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (course_id, title, description, video_url, position, duration_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, course_id, title, description, video_url,
                      position, duration_seconds, created_at
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(description)
        .bind(video_url)
        .bind(position)
        .bind(duration_seconds)
        .fetch_one(db)
        .await?;
        Ok(lesson)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::Lesson;
    use crate::auth::repo::Role;
    use crate::state::test_support::{seed_course, seed_user};

    #[sqlx::test(migrations = "./migrations")]
    async fn lessons_come_back_in_position_order(pool: PgPool) {
        let instructor = seed_user(&pool, Role::Instructor).await;
        let course = seed_course(&pool, instructor.id, 0).await;

        for position in [3, 1, 2] {
            Lesson::create(
                &pool,
                course.id,
                &format!("Lesson {position}"),
                None,
                None,
                position,
                120,
            )
            .await
            .unwrap();
        }

        let lessons = Lesson::list_by_course(&pool, course.id).await.unwrap();
        let positions: Vec<i32> = lessons.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }
}
