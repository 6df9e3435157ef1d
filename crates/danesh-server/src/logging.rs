//! Tracing subscriber setup shared by the binaries.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` controls filtering; `DANESH_LOG_JSON` switches to
/// line-delimited JSON output.
pub fn init(crate_directive: &str) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let filter = match crate_directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    let json = std::env::var("DANESH_LOG_JSON").is_ok();
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
