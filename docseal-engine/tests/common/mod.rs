#![allow(dead_code)]

use std::sync::Arc;

use docseal_access::{InMemoryAuditLog, Role};
use docseal_engine::{Engine, EngineConfig, LoginOutcome};
use docseal_storage::{
    InMemoryDecisionStore, InMemoryObjectStore, InMemoryOtpStore, InMemoryUserStore,
};

pub const PASSWORD: &str = "Correct-Horse-42";

pub struct TestEnv {
    pub engine: Arc<Engine>,
    pub audit: Arc<InMemoryAuditLog>,
    pub decisions: Arc<InMemoryDecisionStore>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        init_tracing();
        let audit = Arc::new(InMemoryAuditLog::new());
        let decisions = Arc::new(InMemoryDecisionStore::new());
        let engine = Arc::new(Engine::with_stores(
            config,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryOtpStore::new()),
            decisions.clone(),
            audit.clone(),
        ));
        Self {
            engine,
            audit,
            decisions,
        }
    }

    /// Register and activate an account in one step.
    pub async fn register_active(&self, email: &str, role: Role) {
        let receipt = self.engine.register(email, role, PASSWORD).await.unwrap();
        self.engine
            .confirm_registration(email, &receipt.otp_code)
            .await
            .unwrap();
    }

    /// Log in, completing the second factor if the engine demands one.
    pub async fn login(&self, email: &str) -> String {
        match self.engine.login(email, PASSWORD).await.unwrap() {
            LoginOutcome::Complete { session_id } => session_id,
            LoginOutcome::OtpRequired {
                session_id,
                otp_code,
                ..
            } => {
                self.engine
                    .complete_login(&session_id, &otp_code)
                    .await
                    .unwrap();
                session_id
            }
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docseal_engine=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A six-digit code guaranteed not to equal `code`.
pub fn wrong_code(code: &str) -> &'static str {
    if code == "000000" {
        "000001"
    } else {
        "000000"
    }
}
