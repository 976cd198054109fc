use cellgraph::config::Config;

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    cellgraph::init_tracing(&config)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    cellgraph::run_shell(&config, stdin.lock(), &mut output)
}
