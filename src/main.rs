use std::env;

use rentbuy::api::CliError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = rentbuy::api::run_http_server(port).await {
            tracing::error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    match rentbuy::api::run_cli(raw_args) {
        Ok(report) => print!("{report}"),
        Err(CliError::Args(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Usage: rentbuy [flags] | rentbuy serve [port]");
            std::process::exit(1);
        }
    }
}
