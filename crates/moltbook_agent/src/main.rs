use std::io;

use anyhow::Context;
use clap::Parser;
use moltbook_agent::{App, AppExit, Cli};
use moltbook_api::MoltbookClient;
use moltbook_tui::config::EnvConfig;
use moltbook_tui::prompt::ChannelPrompt;
use moltbook_tui::{logging, terminal};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env = EnvConfig::from_env();
    logging::init(&env).context("failed to initialize logging")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run(cli, env))
}

async fn run(cli: Cli, env: EnvConfig) -> anyhow::Result<()> {
    let config = cli.api_config(&env);
    info!(base_url = %config.base_url, data_dir = %config.paths.root().display(), "starting");
    let client = MoltbookClient::new(config).context("failed to set up moltbook client")?;
    let app = App::new(client, cli.claim_flow(&env))
        .with_width(usize::from(terminal::columns()));

    let mut prompt = ChannelPrompt::stdio();
    let mut out = io::stdout();
    match app.run(&mut prompt, &mut out).await? {
        AppExit::Finished => info!("feed closed"),
        AppExit::Quit => info!("quit before claim"),
    }
    Ok(())
}
