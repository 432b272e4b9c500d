use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize logging on stderr.
///
/// `quiet` limits output to error-level events; otherwise info and above
/// are emitted. `json` switches from the human-readable format to one JSON
/// object per line. `RUST_LOG` directives are honoured on top of the default.
pub fn init_logging(quiet: bool, json: bool) {
    let directive = if quiet { "wtpc=error" } else { "wtpc=info" };
    let filter = match directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry().with(fmt_layer).with(filter).init();
}
