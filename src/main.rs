use std::path::PathBuf;

use batch_migrate::error::Result;
use batch_migrate::output::Format;
use batch_migrate::schema::LegacySchema;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "batch-migrate",
    version,
    about = "Migrate legacy batch-result JSON into the tagged-union batch layout"
)]
struct Cli {
    /// Legacy batch JSON file; the result is written next to it as <INPUT>.new
    input: PathBuf,
    /// Legacy layout the input follows
    #[arg(long, value_enum, default_value = "remote-batch")]
    from: LegacySchema,
    /// Convert and validate without writing the output file
    #[arg(long)]
    dry_run: bool,
    /// Output format for the migration report
    #[arg(long, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, hide = true)]
    pretty: bool,
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, format: Format) -> Result<()> {
    batch_migrate::commands::migrate::run(&cli.input, cli.from, cli.dry_run, format)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(&cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
