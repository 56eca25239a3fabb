use anyhow::Result;
use clap::Parser;
use tracing::info;

use ipshorter::cli::{Cli, Commands, ConfigCommands, config_generate};
use ipshorter::config::{get_config, init_config_from};
use ipshorter::runtime::modes::run_server;
use ipshorter::system::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    }) = cli.command
    {
        let path = config_generate(output_path, force)?;
        println!("Configuration file generated: {}", path);
        return Ok(());
    }

    init_config_from(&cli.config);
    let config = get_config();

    // guard 需要存活到进程结束
    let _log_guard = init_logging(&config.logging)?;
    info!("Starting ipshorter v{}", env!("CARGO_PKG_VERSION"));

    run_server(&config).await
}
