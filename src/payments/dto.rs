use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub session_id: String,
}

/// Stripe substitutes the `{CHECKOUT_SESSION_ID}` placeholder when it
/// redirects the buyer back.
pub(crate) fn success_url(frontend_url: &str, course_id: Uuid) -> String {
    format!(
        "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}&courseId={}",
        frontend_url.trim_end_matches('/'),
        course_id
    )
}

pub(crate) fn cancel_url(frontend_url: &str, course_id: Uuid) -> String {
    format!("{}/courses/{}", frontend_url.trim_end_matches('/'), course_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_url_keeps_session_placeholder() {
        let id = Uuid::new_v4();
        let url = success_url("https://app.example.com/", id);
        assert!(url.contains("session_id={CHECKOUT_SESSION_ID}"));
        assert!(url.contains(&format!("courseId={id}")));
        assert!(!url.contains(".com//"));
    }

    #[test]
    fn cancel_url_points_back_at_course_page() {
        let id = Uuid::new_v4();
        assert_eq!(
            cancel_url("https://app.example.com", id),
            format!("https://app.example.com/courses/{id}")
        );
    }
}
