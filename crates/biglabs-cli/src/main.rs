use std::path::PathBuf;

use anyhow::Result;
use biglabs_application::AppBootstrap;
use biglabs_infrastructure::ConfigService;
use biglabs_infrastructure::paths::BiglabsPaths;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "biglabs")]
#[command(version, about = "Biglabs CLI - account, profile and business-insight tools", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to ~/.config/biglabs)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the mode and the resolved session
    Status {
        /// Print the session snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Sign out of the current session
    SignOut,
    /// Show or edit the signed-in user's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Change the signed-in user's password
    Password {
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Send a password-recovery email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Ask the business-intelligence assistant a question
    Insight {
        message: String,
        /// Dashboard context (analytics, strategy)
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the profile
    Show,
    /// Update profile fields; omitted fields are left unchanged
    Update(commands::profile::UpdateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = BiglabsPaths::new(cli.config_dir.as_deref());
    let config = ConfigService::new(&paths).get_config();
    let _log_guard = logging::init(&paths, &config.log_level, cli.debug);

    let app = AppBootstrap::build(cli.config_dir.as_deref()).await?;

    let result = match cli.command {
        Commands::Status { json } => commands::status::run(&app, json).await,
        Commands::SignIn { email, password } => {
            commands::account::sign_in(&app, &email, &password).await
        }
        Commands::SignUp {
            email,
            password,
            first_name,
            last_name,
        } => commands::account::sign_up(&app, &email, &password, &first_name, &last_name).await,
        Commands::SignOut => commands::account::sign_out(&app).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&app).await,
            ProfileAction::Update(args) => commands::profile::update(&app, args).await,
        },
        Commands::Password { password, confirm } => {
            commands::account::update_password(&app, &password, &confirm).await
        }
        Commands::ResetPassword { email } => commands::account::reset_password(&app, &email).await,
        Commands::Insight { message, context } => {
            commands::insight::run(&app, &message, context.as_deref()).await
        }
    };

    if let Err(e) = &result {
        tracing::debug!("[Cli] Command failed: {:#}", e);
    }
    app.shutdown();
    result
}
