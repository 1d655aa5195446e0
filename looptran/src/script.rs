use clap::Arg;
use clap::ArgAction;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

/// Initialize logging with the given level.
pub fn init_subscriber(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Default arguments for transformation-script executables.
///
/// `--debug` is not included so that downstream scripts can handle logging
/// differently.
pub fn script_arguments() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .long("config")
            .help("Path to a settings file, overriding the usual resolution")
            .action(ArgAction::Set),
        Arg::new("print-tree-before")
            .long("print-tree-before")
            .help("Print the tree before the transformation")
            .action(ArgAction::SetTrue),
        Arg::new("print-tree-after")
            .long("print-tree-after")
            .help("Print the tree after the transformation")
            .action(ArgAction::SetTrue),
    ]
}
