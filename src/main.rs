use clap::Parser;

use shopwhisper::cli::{AuthCommand, Cli, Commands};
use shopwhisper::commands::ask::cmd_ask;
use shopwhisper::commands::auth::{
    cmd_auth_list, cmd_auth_login, cmd_auth_logout, cmd_auth_status, cmd_auth_test,
};
use shopwhisper::commands::chat::cmd_chat;
use shopwhisper::error::{Result, ShopError};
use shopwhisper::{logging, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The chat widget owns the terminal, so it logs to a file
    if matches!(cli.command, Commands::Chat { .. }) {
        logging::init_chat_log(cli.verbose)?;
    } else {
        logging::init_stderr(cli.verbose);
    }

    match cli.command {
        // Auth commands operate on auth.json directly, except `test`
        Commands::Auth { command } => match command {
            AuthCommand::Login {
                service,
                set_default,
            } => cmd_auth_login(service, set_default),
            AuthCommand::List => cmd_auth_list(),
            AuthCommand::Logout { service } => cmd_auth_logout(&service),
            AuthCommand::Status => cmd_auth_status(),
            AuthCommand::Test { provider } => {
                let config = Config::load(provider.as_deref())?;
                cmd_auth_test(&config)
            }
        },

        Commands::Ask {
            query,
            all,
            json,
            provider,
        } => {
            // Reject before resolving credentials
            if query.trim().is_empty() {
                return Err(ShopError::EmptyQuery);
            }
            let config = Config::load(provider.as_deref())?;
            cmd_ask(&config, &query, all, json)
        }

        Commands::Chat { provider } => {
            let config = Config::load(provider.as_deref())?;
            cmd_chat(&config)
        }
    }
}
