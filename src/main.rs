use clap::Parser;

use trackdesk::cli::{Cli, Commands};
use trackdesk::config::{get_config, init_config};
use trackdesk::runtime::modes;
use trackdesk::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config(cli.config.as_deref());

    match cli.command {
        None | Some(Commands::Serve) => {
            let config = get_config();
            let _guard = init_logging(&config.logging)?;
            if let Err(e) = modes::run_server().await {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        #[cfg(feature = "cli")]
        Some(command) => modes::run_cli(command),
        #[cfg(not(feature = "cli"))]
        Some(_) => anyhow::bail!("trackdesk was built without the `cli` feature"),
    }
}
