use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Course record in the database. `price_cents = 0` means free.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub is_published: bool,
    pub instructor_id: Uuid,
    pub slug: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Course {
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }
}

/// Course row joined with its instructor's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct CourseWithInstructorRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub is_published: bool,
    pub instructor_id: Uuid,
    pub slug: String,
    pub created_at: OffsetDateTime,
    pub instructor_name: String,
    pub instructor_email: String,
}

const COURSE_WITH_INSTRUCTOR: &str = r#"
    SELECT c.id, c.title, c.description, c.thumbnail_url, c.price_cents,
           c.is_published, c.instructor_id, c.slug, c.created_at,
           u.name AS instructor_name, u.email AS instructor_email
    FROM courses c
    JOIN users u ON u.id = c.instructor_id
"#;

impl Course {
    pub async fn list(
        db: &PgPool,
        limit: i64,
        offset: i64,
        q: Option<&str>,
    ) -> anyhow::Result<Vec<CourseWithInstructorRow>> {
        let rows = match q {
            Some(q) => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, CourseWithInstructorRow>(&format!(
                    "{COURSE_WITH_INSTRUCTOR} WHERE c.title ILIKE $1 \
                     ORDER BY c.created_at DESC LIMIT $2 OFFSET $3"
                ))
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, CourseWithInstructorRow>(&format!(
                    "{COURSE_WITH_INSTRUCTOR} ORDER BY c.created_at DESC LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn find_with_instructor(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<Option<CourseWithInstructorRow>> {
        let row = sqlx::query_as::<_, CourseWithInstructorRow>(&format!(
            "{COURSE_WITH_INSTRUCTOR} WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, thumbnail_url, price_cents,
                   is_published, instructor_id, slug, created_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(course)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        title: &str,
        description: Option<&str>,
        thumbnail_url: Option<&str>,
        price_cents: i64,
        is_published: bool,
        instructor_id: Uuid,
        slug: &str,
    ) -> anyhow::Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses
                (title, description, thumbnail_url, price_cents, is_published, instructor_id, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, thumbnail_url, price_cents,
                      is_published, instructor_id, slug, created_at
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(thumbnail_url)
        .bind(price_cents)
        .bind(is_published)
        .bind(instructor_id)
        .bind(slug)
        .fetch_one(db)
        .await?;
        Ok(course)
    }

    /// Partial update; absent fields keep their stored values.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        thumbnail_url: Option<&str>,
        price_cents: Option<i64>,
        is_published: Option<bool>,
    ) -> anyhow::Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url),
                price_cents = COALESCE($5, price_cents),
                is_published = COALESCE($6, is_published)
            WHERE id = $1
            RETURNING id, title, description, thumbnail_url, price_cents,
                      is_published, instructor_id, slug, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(thumbnail_url)
        .bind(price_cents)
        .bind(is_published)
        .fetch_one(db)
        .await?;
        Ok(course)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
