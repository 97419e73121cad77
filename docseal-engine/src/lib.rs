//! # docseal-engine: secure document custody and access control
//!
//! The composed engine the routing layer consumes: account registration and
//! OTP activation, password login with session-scoped private-key custody,
//! per-recipient sealed papers and reviews, a fail-closed access-control
//! matrix with a mandatory audit trail, and non-repudiable signed decisions.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use docseal_engine::{Engine, EngineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(Engine::in_memory(EngineConfig::load()?));
//! engine.spawn_sweeper();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod custody;
mod engine;
pub mod error;
mod session;

pub use config::EngineConfig;
pub use custody::KeyCustody;
pub use engine::{
    AuthContext, DecisionView, DocumentView, Engine, LoginOutcome, RegistrationReceipt,
    SubmitReceipt,
};
pub use error::{EngineError, EngineResult};
