use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::courses::repo::CourseWithInstructorRow;

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub q: Option<String>,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    12
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: Option<i64>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct InstructorInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Catalog view of a course with its instructor embedded.
#[derive(Debug, Serialize)]
pub struct CourseDetails {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub is_published: bool,
    pub slug: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub instructor: InstructorInfo,
}

impl From<CourseWithInstructorRow> for CourseDetails {
    fn from(r: CourseWithInstructorRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            thumbnail_url: r.thumbnail_url,
            price_cents: r.price_cents,
            is_published: r.is_published,
            slug: r.slug,
            created_at: r.created_at,
            instructor: InstructorInfo {
                id: r.instructor_id,
                name: r.instructor_name,
                email: r.instructor_email,
            },
        }
    }
}
