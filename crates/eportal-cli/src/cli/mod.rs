//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use eportal_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "eportal")]
#[command(version)]
#[command(about = "Municipal e-portal account client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with your national ID
    Login {
        /// 11-digit national ID
        #[arg(long, value_name = "ID")]
        national_id: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "EPORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and remove the saved session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Re-check the saved session with the backend
        #[arg(long)]
        refresh: bool,
    },

    /// Request password reset instructions
    ForgotPassword {
        /// 11-digit national ID
        #[arg(long, value_name = "ID")]
        national_id: String,
    },

    /// Create a new account
    Register {
        /// 11-digit national ID
        #[arg(long, value_name = "ID")]
        national_id: String,

        /// Full name (letters and spaces)
        #[arg(long)]
        name: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "EPORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Update the signed-in user's name or password
    Profile {
        /// New display name (keeps the current name when omitted)
        #[arg(long)]
        name: Option<String>,

        /// New password, at least 6 characters
        #[arg(long, env = "EPORTAL_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,

        /// Current password, needed only with --new-password (read from stdin when omitted)
        #[arg(long, env = "EPORTAL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write the default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    let _log_guard = logging::init(&config.logging).context("init logging")?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, config).await })
}

async fn dispatch(cli: Cli, config: config::Config) -> Result<()> {
    match cli.command {
        Commands::Login {
            national_id,
            password,
        } => commands::auth::login(&config, national_id, password).await,
        Commands::Logout => commands::auth::logout(),
        Commands::Whoami { refresh } => commands::auth::whoami(&config, refresh).await,
        Commands::ForgotPassword { national_id } => {
            commands::auth::forgot_password(&config, national_id).await
        }
        Commands::Register {
            national_id,
            name,
            password,
        } => commands::auth::register(&config, national_id, name, password).await,
        Commands::Profile {
            name,
            new_password,
            password,
        } => commands::auth::profile(&config, name, new_password, password).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
