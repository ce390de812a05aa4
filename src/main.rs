use clap::Parser;

use tubenote::cli::Cli;
use tubenote::config::Config;

#[tokio::main]
async fn main() {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match Config::load() {
        Ok(config) => cli.execute(&config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if e.is_user_error() {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("Unexpected error: {}", e);
        }
        std::process::exit(1);
    }
}
