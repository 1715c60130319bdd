use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "inkwell_posts_created_total",
            Unit::Count,
            "Total number of posts created."
        );
        describe_counter!(
            "inkwell_posts_edited_total",
            Unit::Count,
            "Total number of successful post edits."
        );
        describe_counter!(
            "inkwell_posts_deleted_total",
            Unit::Count,
            "Total number of posts deleted."
        );
        describe_counter!(
            "inkwell_posts_status_changed_total",
            Unit::Count,
            "Total number of featured/starred status changes, labelled by operation."
        );
        describe_counter!(
            "inkwell_post_lookup_failures_total",
            Unit::Count,
            "Total number of operations that referenced a missing post."
        );
        describe_gauge!(
            "inkwell_posts_stored",
            Unit::Count,
            "Current number of posts held by the store."
        );
    });
}
