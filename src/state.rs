use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::payments::provider::{PaymentProvider, StripeCheckout};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let payments = Arc::new(StripeCheckout::new(&config.stripe)) as Arc<dyn PaymentProvider>;

        Ok(Self {
            db,
            config,
            payments,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::AppState;
    use crate::auth::repo::{Role, User};
    use crate::config::{AppConfig, JwtConfig, StripeConfig};
    use crate::courses::repo::Course;
    use crate::payments::provider::{
        CheckoutSession, PaymentError, PaymentProvider, PaymentStatus, SessionRequest,
        SessionStatus,
    };

    /// Payment provider stub reporting a fixed session status.
    pub struct StubPayments {
        pub status: SessionStatus,
    }

    #[async_trait]
    impl PaymentProvider for StubPayments {
        async fn create_session(
            &self,
            req: &SessionRequest,
        ) -> Result<CheckoutSession, PaymentError> {
            Ok(CheckoutSession {
                id: "cs_stub".into(),
                url: format!("https://checkout.stub/{}", req.course_id),
            })
        }

        async fn session_status(&self, _session_id: &str) -> Result<SessionStatus, PaymentError> {
            Ok(self.status)
        }
    }

    pub fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            database_url: "postgres://unused".into(),
            frontend_url: "http://localhost:5173".into(),
            uploads_dir: "uploads".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            stripe: StripeConfig {
                secret_key: "sk_test".into(),
                api_base: "https://stripe.invalid".into(),
                currency: "usd".into(),
            },
        })
    }

    pub fn state_with(db: PgPool, payments: Arc<dyn PaymentProvider>) -> AppState {
        AppState {
            db,
            config: test_config(),
            payments,
        }
    }

    /// State whose provider never reports a paid session.
    pub fn state(db: PgPool) -> AppState {
        state_with(
            db,
            Arc::new(StubPayments {
                status: SessionStatus {
                    payment: PaymentStatus::Unpaid,
                    course_id: None,
                },
            }),
        )
    }

    pub async fn seed_user(db: &PgPool, role: Role) -> User {
        let email = format!("{}@example.com", Uuid::new_v4().simple());
        User::create(db, "Test User", &email, "unused-hash", role)
            .await
            .expect("seed user")
    }

    pub async fn seed_course(db: &PgPool, instructor_id: Uuid, price_cents: i64) -> Course {
        let slug = format!("course-{}", Uuid::new_v4().simple());
        Course::create(
            db,
            "Test Course",
            None,
            None,
            price_cents,
            true,
            instructor_id,
            &slug,
        )
        .await
        .expect("seed course")
    }
}
