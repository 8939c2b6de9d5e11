use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::Actor,
    courses::repo::Course,
    lessons::{dto::CreateLessonRequest, repo::Lesson},
    response::{internal, Data},
    state::AppState,
};

pub fn lesson_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lessons/:course_id",
            get(list_lessons).post(create_lesson),
        )
        .route("/lessons/lesson/:id", get(get_lesson))
}

#[instrument(skip(state))]
pub async fn list_lessons(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Data<Vec<Lesson>>>, (StatusCode, String)> {
    let lessons = Lesson::list_by_course(&state.db, course_id)
        .await
        .map_err(internal)?;
    Ok(Json(Data::new(lessons)))
}

#[instrument(skip(state))]
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Data<Lesson>>, (StatusCode, String)> {
    let lesson = Lesson::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Lesson not found".to_string()))?;
    Ok(Json(Data::new(lesson)))
}

#[instrument(skip(state, payload))]
pub async fn create_lesson(
    State(state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Data<Lesson>>), (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title is required".into()));
    }
    if payload.position < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Position must be non-negative".into(),
        ));
    }

    let course = Course::find_by_id(&state.db, course_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    if !actor.may_manage(course.instructor_id) {
        warn!(course_id = %course_id, user_id = %actor.user_id, "lesson create refused");
        return Err((StatusCode::FORBIDDEN, "Forbidden".into()));
    }

    let lesson = Lesson::create(
        &state.db,
        course_id,
        payload.title.trim(),
        payload.description.as_deref(),
        payload.video_url.as_deref(),
        payload.position,
        payload.duration_seconds,
    )
    .await
    .map_err(internal)?;

    info!(lesson_id = %lesson.id, course_id = %course_id, "lesson created");
    Ok((StatusCode::CREATED, Json(Data::new(lesson))))
}
