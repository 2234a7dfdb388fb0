use std::sync::Once;

use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::error::{GameError, GameResult};
use crate::formatter::SceneFormatter;

static SUBSCRIBER_INIT: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter (debug for this crate, warn elsewhere). Calling
/// this more than once is harmless; only the first call does anything.
pub fn setup_logging() -> GameResult<()> {
    let mut result = Ok(());

    SUBSCRIBER_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{name}=debug", name = env!("CARGO_CRATE_NAME"))));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().event_format(SceneFormatter))
            .with(ErrorLayer::default());

        result = tracing::subscriber::set_global_default(subscriber).map_err(|e| GameError::Logging(e.to_string()));
    });

    result
}
