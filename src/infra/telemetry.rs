use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::tracker::{FRAMES_METRIC, SKIPS_METRIC, SUPPRESSED_METRIC, TRIGGERS_METRIC},
    config::{LogFormat, LoggingSettings},
};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            FRAMES_METRIC,
            Unit::Count,
            "Total number of frames computed by reading-position trackers."
        );
        describe_counter!(
            TRIGGERS_METRIC,
            Unit::Count,
            "Total number of end-of-region load triggers fired."
        );
        describe_counter!(
            SUPPRESSED_METRIC,
            Unit::Count,
            "Total number of load triggers held back because the next region was already loading."
        );
        describe_counter!(
            SKIPS_METRIC,
            Unit::Count,
            "Total number of regions or frames skipped because they could not be measured."
        );
    });
}
