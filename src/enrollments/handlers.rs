use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::Actor,
    courses::repo::Course,
    enrollments::{
        dto::{progress_in_bounds, ProgressRequest},
        repo::Enrollment,
    },
    response::{internal, Data},
    state::AppState,
};

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/enroll/:course_id", post(enroll).get(get_enrollment))
        .route("/enroll/:course_id/progress", post(update_progress))
}

/// Direct enrollment is the free-course path. Paid courses must go
/// through checkout, so a positive price is refused here outright.
#[instrument(skip(state))]
pub async fn enroll(
    State(state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Data<Enrollment>>, (StatusCode, String)> {
    let course = Course::find_by_id(&state.db, course_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    if !course.is_free() {
        warn!(course_id = %course_id, user_id = %actor.user_id, "direct enroll on paid course");
        return Err((
            StatusCode::PAYMENT_REQUIRED,
            "Course requires payment".into(),
        ));
    }

    let enrollment = Enrollment::upsert(&state.db, actor.user_id, course_id)
        .await
        .map_err(internal)?;

    info!(course_id = %course_id, user_id = %actor.user_id, "enrolled");
    Ok(Json(Data::new(enrollment)))
}

#[instrument(skip(state))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Data<Enrollment>>, (StatusCode, String)> {
    let enrollment = Enrollment::find(&state.db, actor.user_id, course_id)
        .await
        .map_err(internal)?;

    match enrollment {
        Some(e) => Ok(Json(Data::new(e))),
        None => {
            // Expected outcome; drives the locked/unlocked UI state.
            debug!(course_id = %course_id, user_id = %actor.user_id, "not enrolled");
            Err((StatusCode::NOT_FOUND, "Not enrolled".into()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_progress(
    State(state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ProgressRequest>,
) -> Result<Json<Data<Enrollment>>, (StatusCode, String)> {
    if !progress_in_bounds(payload.progress) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Progress must be between 0 and 100".into(),
        ));
    }

    let enrollment =
        Enrollment::set_progress(&state.db, actor.user_id, course_id, payload.progress)
            .await
            .map_err(internal)?
            .ok_or((StatusCode::NOT_FOUND, "Not enrolled".to_string()))?;

    debug!(course_id = %course_id, user_id = %actor.user_id, progress = payload.progress, "progress updated");
    Ok(Json(Data::new(enrollment)))
}
