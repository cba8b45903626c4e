// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified set-up of tracing subscribers for programs built on the poll client.

use std::env;

use is_terminal::IsTerminal as _;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Format, Full},
        time::FormatTime,
        FormatFields, MakeWriter,
    },
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Initializes tracing in a standard way.
///
/// The environment variables `RUST_LOG`, `RUST_LOG_SPAN_EVENTS` and `RUST_LOG_FORMAT`
/// control the verbosity, the span event verbosity and the output format. Colors are
/// disabled when `NO_COLOR` is set or when standard error is not a terminal.
///
/// Unknown output formats fall back to the plain format, with a warning naming `log_name`.
pub fn init(log_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let span_events = env::var("RUST_LOG_SPAN_EVENTS")
        .ok()
        .map_or(FmtSpan::NONE, |events| fmt_span_from_str(&events));

    let format = env::var("RUST_LOG_FORMAT").ok();
    let color_output =
        !env::var("NO_COLOR").is_ok_and(|x| !x.is_empty()) && std::io::stderr().is_terminal();

    let (stderr_layer, format_is_known) = prepare_formatted_layer(
        format.as_deref(),
        fmt::layer()
            .with_span_events(span_events)
            .with_writer(std::io::stderr)
            .with_ansi(color_output),
    );

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();

    if !format_is_known {
        tracing::warn!(
            log_name,
            "invalid RUST_LOG_FORMAT {format:?}: valid values are `json`, `pretty` and `plain`"
        );
    }
}

/// Applies the requested `formatting` to the log output of `layer`.
///
/// Also returns whether the formatting was recognized.
fn prepare_formatted_layer<S, N, W, T>(
    formatting: Option<&str>,
    layer: fmt::Layer<S, N, Format<Full, T>, W>,
) -> (Box<dyn Layer<S> + Send + Sync>, bool)
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + Send + Sync + 'static,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    T: FormatTime + Send + Sync + 'static,
{
    match formatting.unwrap_or("plain") {
        "json" => (layer.json().boxed(), true),
        "pretty" => (layer.pretty().boxed(), true),
        "plain" => (layer.boxed(), true),
        _ => (layer.boxed(), false),
    }
}

fn fmt_span_from_str(events: &str) -> FmtSpan {
    let mut fmt_span = FmtSpan::NONE;
    for event in events.split(',') {
        fmt_span |= match event {
            "new" => FmtSpan::NEW,
            "enter" => FmtSpan::ENTER,
            "exit" => FmtSpan::EXIT,
            "close" => FmtSpan::CLOSE,
            "active" => FmtSpan::ACTIVE,
            "full" => FmtSpan::FULL,
            _ => FmtSpan::NONE,
        };
    }
    fmt_span
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        Registry,
    };

    use super::{fmt_span_from_str, init, prepare_formatted_layer};

    #[test]
    fn span_events_are_combined() {
        assert_eq!(fmt_span_from_str("new,close"), FmtSpan::NEW | FmtSpan::CLOSE);
        assert_eq!(fmt_span_from_str("bogus"), FmtSpan::NONE);
    }

    #[test]
    fn output_formats_are_recognized() {
        for format in [None, Some("json"), Some("pretty"), Some("plain")] {
            let (_, known) = prepare_formatted_layer(format, fmt::layer::<Registry>());
            assert!(known, "{format:?}");
        }
        let (_, known) = prepare_formatted_layer(Some("yaml"), fmt::layer::<Registry>());
        assert!(!known);
    }

    #[test]
    fn init_tolerates_an_installed_subscriber() {
        init("first");
        init("second");
        tracing::info!("logging still works");
    }
}
