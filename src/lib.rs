//! Translation orchestration core with a cache, an ordered list of remote
//! backends and an offline dictionary fallback.
//!
//! ## Layout
//!
//! - `shared`: data model, error taxonomy, settings
//! - `core`: catalog, offline dictionary, store, backends, orchestrator,
//!   coordinator, session, speech boundary
//! - `config`: builds the backend list and store from settings
//! - `api`: command handlers used by the `lingo-bridge` binary

pub mod api;
pub mod config;
pub mod core;
pub mod shared;

pub use crate::core::orchestrator::Translator;
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::types::{TranslationRequest, TranslationResult, TranslationSource};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "lingo_bridge=info";

/// Install the fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
