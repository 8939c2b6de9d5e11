use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::Actor,
    courses::{
        dto::{CourseDetails, CourseQuery, CreateCourseRequest, UpdateCourseRequest},
        repo::Course,
        services::make_slug,
    },
    response::{internal, Data},
    state::AppState,
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> Result<Json<Data<Vec<CourseDetails>>>, (StatusCode, String)> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let rows = Course::list(&state.db, limit, offset, query.q.as_deref())
        .await
        .map_err(internal)?;
    let items = rows.into_iter().map(CourseDetails::from).collect();
    Ok(Json(Data::new(items)))
}

#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Data<CourseDetails>>, (StatusCode, String)> {
    let row = Course::find_with_instructor(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;
    Ok(Json(Data::new(row.into())))
}

#[instrument(skip(state, payload))]
pub async fn create_course(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Data<Course>>), (StatusCode, String)> {
    if !actor.may_create_courses() {
        warn!(user_id = %actor.user_id, role = ?actor.role, "course create refused");
        return Err((StatusCode::FORBIDDEN, "Forbidden".into()));
    }
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title is required".into()));
    }
    if payload.price_cents < 0 {
        return Err((StatusCode::BAD_REQUEST, "Price must be non-negative".into()));
    }

    let slug = make_slug(&payload.title);
    let course = Course::create(
        &state.db,
        payload.title.trim(),
        payload.description.as_deref(),
        payload.thumbnail_url.as_deref(),
        payload.price_cents,
        payload.is_published,
        actor.user_id,
        &slug,
    )
    .await
    .map_err(internal)?;

    info!(course_id = %course.id, instructor_id = %actor.user_id, "course created");
    Ok((StatusCode::CREATED, Json(Data::new(course))))
}

#[instrument(skip(state, payload))]
pub async fn update_course(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<Data<Course>>, (StatusCode, String)> {
    let existing = Course::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    if !actor.may_manage(existing.instructor_id) {
        warn!(course_id = %id, user_id = %actor.user_id, "update refused");
        return Err((StatusCode::FORBIDDEN, "Forbidden".into()));
    }

    if let Some(p) = payload.price_cents {
        if p < 0 {
            return Err((StatusCode::BAD_REQUEST, "Price must be non-negative".into()));
        }
    }

    let course = Course::update(
        &state.db,
        id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.thumbnail_url.as_deref(),
        payload.price_cents,
        payload.is_published,
    )
    .await
    .map_err(internal)?;

    Ok(Json(Data::new(course)))
}

#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let existing = Course::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    if !actor.may_manage(existing.instructor_id) {
        warn!(course_id = %id, user_id = %actor.user_id, "delete refused");
        return Err((StatusCode::FORBIDDEN, "Forbidden".into()));
    }

    Course::delete(&state.db, id).await.map_err(internal)?;
    info!(course_id = %id, "course deleted");
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;
    use sqlx::PgPool;

    use super::create_course;
    use crate::auth::extractors::Actor;
    use crate::auth::repo::Role;
    use crate::courses::dto::CreateCourseRequest;
    use crate::state::test_support::{seed_user, state};

    fn course_payload() -> Json<CreateCourseRequest> {
        Json(CreateCourseRequest {
            title: "Intro to Rust".into(),
            description: None,
            thumbnail_url: None,
            price_cents: 0,
            is_published: false,
        })
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn students_cannot_create_courses(pool: PgPool) {
        let student = seed_user(&pool, Role::Student).await;
        let actor = Actor {
            user_id: student.id,
            role: Role::Student,
        };

        let (code, _) = create_course(State(state(pool)), actor, course_payload())
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn instructors_create_and_own_courses(pool: PgPool) {
        let instructor = seed_user(&pool, Role::Instructor).await;
        let actor = Actor {
            user_id: instructor.id,
            role: Role::Instructor,
        };

        let (code, Json(body)) = create_course(State(state(pool)), actor, course_payload())
            .await
            .expect("instructor create succeeds");
        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(body.data.instructor_id, instructor.id);
        assert!(body.data.slug.starts_with("intro-to-rust-"));
    }
}
