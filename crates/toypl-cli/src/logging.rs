use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `TOYPL_LOG` takes directives in the usual
/// `EnvFilter` syntax; without it the level is `warn`, or `debug` when verbose.
pub fn init(verbose: bool) {
    let default = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_env_var("TOYPL_LOG")
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
