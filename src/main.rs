use clap::Parser;
use log::info;
use naval_defense::{init_logging, SessionConfig, SessionController};

#[derive(Parser)]
#[command(author, version, about = "Naval defense exercise server", long_about = None)]
struct Cli {
    /// Address for the attacker TCP listener (one attack per connection).
    #[arg(long, default_value = "0.0.0.0:5000")]
    attack_bind: String,
    /// Address for the observer push channel (JSON lines).
    #[arg(long, default_value = "0.0.0.0:8000")]
    observer_bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut session = SessionController::new(SessionConfig {
        attack_bind: cli.attack_bind,
        observer_bind: cli.observer_bind,
    });
    session.start().await?;
    info!(
        "defense server running: attacks on {:?}, observer on {:?}",
        session.attack_addr(),
        session.observer_addr()
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    session.stop().await;
    Ok(())
}
