use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{extractors::Actor, repo::User},
    courses::repo::Course,
    enrollments::repo::Enrollment,
    payments::{
        dto::{cancel_url, success_url, CheckoutResponse, ConfirmRequest},
        provider::SessionRequest,
    },
    response::{internal, Data},
    state::AppState,
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payment/create-checkout-session/:course_id",
            post(create_checkout_session),
        )
        .route("/payment/confirm/:course_id", post(confirm))
}

#[instrument(skip(state))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CheckoutResponse>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, actor.user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let course = Course::find_by_id(&state.db, course_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    // Free or malformed prices never reach the provider.
    if course.price_cents <= 0 {
        warn!(course_id = %course_id, price_cents = course.price_cents, "checkout on non-paid course");
        return Err((
            StatusCode::BAD_REQUEST,
            "Course has no payable price".into(),
        ));
    }

    let request = SessionRequest {
        course_id: course.id,
        amount_cents: course.price_cents,
        currency: state.config.stripe.currency.clone(),
        product_name: course.title.clone(),
        customer_email: user.email.clone(),
        success_url: success_url(&state.config.frontend_url, course.id),
        cancel_url: cancel_url(&state.config.frontend_url, course.id),
    };

    let session = state.payments.create_session(&request).await.map_err(|e| {
        error!(error = %e, course_id = %course_id, "checkout session failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(session_id = %session.id, course_id = %course_id, user_id = %actor.user_id, "checkout session created");
    Ok(Json(CheckoutResponse { url: session.url }))
}

/// Success-redirect callback. The client-supplied session id is only a
/// claim; the provider is asked for the session's real payment status,
/// and the session must have been opened for this course, before any
/// enrollment is written.
#[instrument(skip(state, payload))]
pub async fn confirm(
    State(state): State<AppState>,
    actor: Actor,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<Data<Enrollment>>, (StatusCode, String)> {
    Course::find_by_id(&state.db, course_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Course not found".to_string()))?;

    let status = state
        .payments
        .session_status(&payload.session_id)
        .await
        .map_err(|e| {
            error!(error = %e, session_id = %payload.session_id, "session status lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    if !status.payment.is_paid() {
        warn!(session_id = %payload.session_id, course_id = %course_id, user_id = %actor.user_id, "confirm with unpaid session");
        return Err((StatusCode::PAYMENT_REQUIRED, "Payment not completed".into()));
    }

    if status.course_id != Some(course_id) {
        warn!(session_id = %payload.session_id, course_id = %course_id, session_course = ?status.course_id, user_id = %actor.user_id, "confirm with session for another course");
        return Err((
            StatusCode::FORBIDDEN,
            "Session does not belong to this course".into(),
        ));
    }

    let enrollment = Enrollment::upsert(&state.db, actor.user_id, course_id)
        .await
        .map_err(internal)?;

    info!(course_id = %course_id, user_id = %actor.user_id, "payment confirmed, enrolled");
    Ok(Json(Data::new(enrollment)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::{confirm, create_checkout_session};
    use crate::auth::extractors::Actor;
    use crate::auth::repo::Role;
    use crate::enrollments::repo::Enrollment;
    use crate::payments::dto::ConfirmRequest;
    use crate::payments::provider::{PaymentStatus, SessionStatus};
    use crate::state::test_support::{seed_course, seed_user, state_with, StubPayments};
    use crate::state::AppState;

    fn state_reporting(pool: PgPool, payment: PaymentStatus, course_id: Option<Uuid>) -> AppState {
        state_with(
            pool,
            Arc::new(StubPayments {
                status: SessionStatus { payment, course_id },
            }),
        )
    }

    async fn seed_paid_course(pool: &PgPool) -> (Actor, Uuid) {
        let instructor = seed_user(pool, Role::Instructor).await;
        let student = seed_user(pool, Role::Student).await;
        let course = seed_course(pool, instructor.id, 49900).await;
        (
            Actor {
                user_id: student.id,
                role: Role::Student,
            },
            course.id,
        )
    }

    fn confirm_body() -> Json<ConfirmRequest> {
        Json(ConfirmRequest {
            session_id: "cs_stub".into(),
        })
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn paid_session_for_the_course_enrolls(pool: PgPool) {
        let (actor, course_id) = seed_paid_course(&pool).await;
        let state = state_reporting(pool.clone(), PaymentStatus::Paid, Some(course_id));

        let res = confirm(State(state), actor, Path(course_id), confirm_body())
            .await
            .expect("confirm should enroll");
        assert_eq!(res.0.data.user_id, actor.user_id);
        assert_eq!(res.0.data.progress, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unpaid_session_grants_nothing(pool: PgPool) {
        let (actor, course_id) = seed_paid_course(&pool).await;
        let state = state_reporting(pool.clone(), PaymentStatus::Unpaid, Some(course_id));

        let (code, _) = confirm(State(state), actor, Path(course_id), confirm_body())
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::PAYMENT_REQUIRED);
        assert!(Enrollment::find(&pool, actor.user_id, course_id)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn paid_session_for_another_course_grants_nothing(pool: PgPool) {
        // A session bought for one course must not be replayable against
        // a different one.
        let (actor, expensive) = seed_paid_course(&pool).await;
        let instructor = seed_user(&pool, Role::Instructor).await;
        let cheap = seed_course(&pool, instructor.id, 1).await;
        let state = state_reporting(pool.clone(), PaymentStatus::Paid, Some(cheap.id));

        let (code, _) = confirm(State(state), actor, Path(expensive), confirm_body())
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::FORBIDDEN);
        assert!(Enrollment::find(&pool, actor.user_id, expensive)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn session_creation_alone_grants_nothing(pool: PgPool) {
        let (actor, course_id) = seed_paid_course(&pool).await;
        let state = state_reporting(pool.clone(), PaymentStatus::Unpaid, None);

        let res = create_checkout_session(State(state), actor, Path(course_id))
            .await
            .expect("session should be created");
        assert!(res.0.url.starts_with("https://checkout.stub/"));
        assert!(Enrollment::find(&pool, actor.user_id, course_id)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn checkout_rejects_free_course(pool: PgPool) {
        let instructor = seed_user(&pool, Role::Instructor).await;
        let student = seed_user(&pool, Role::Student).await;
        let free = seed_course(&pool, instructor.id, 0).await;
        let actor = Actor {
            user_id: student.id,
            role: Role::Student,
        };
        let state = state_reporting(pool, PaymentStatus::Unpaid, None);

        let (code, _) = create_checkout_session(State(state), actor, Path(free.id))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
    }
}
