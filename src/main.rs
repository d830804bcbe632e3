use clap::Parser;
use tracing::Level;

/// Runs a problem built on lazy sequences.
#[derive(Parser)]
struct Cli {
    /// Problem id, e.g. p007, or `list` to show every problem
    id: String,
    /// Log sequence lifecycle events as well (repeat for replays)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Arguments for the problem, as `--name value`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn enable_tracing(verbose: u8) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    enable_tracing(cli.verbose);
    if cli.id == "list" {
        for entry in lazyset::infra::entries() {
            println!("{:<6} {}", entry.id, entry.about);
        }
        return Ok(());
    }
    println!("{}", lazyset::infra::dispatch(&cli.id, &cli.args)?);
    Ok(())
}
