#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use janggi::playout::{run, PlayoutConfig};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // selfplay [games] [max_plies]; JANGGI_SEED fixes the random sequence.
    let mut config = PlayoutConfig::new();
    let mut args = std::env::args().skip(1);
    if let Some(games) = args.next().and_then(|a| a.parse().ok()) {
        config.games = games;
    }
    if let Some(plies) = args.next().and_then(|a| a.parse().ok()) {
        config.max_plies = plies;
    }
    config.seed = std::env::var("JANGGI_SEED").ok().and_then(|s| s.parse().ok());

    let report = run(&config);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to encode report: {err}"),
    }
    if !report.violations.is_empty() {
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
