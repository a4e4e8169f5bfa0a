//! Platform administration from the command line.
//!
//! ```bash
//! # Create the first platform administrator
//! STOREHUB_ADMIN_PASSWORD=... storehub-admin create-super-admin -e ops@example.com -n "Ops"
//! ```
//!
//! `DATABASE_URL` selects the database, as for the server.

use clap::{Parser, Subcommand};
use thiserror::Error;

use storehub::config::{ConfigError, ServerConfig};
use storehub::db::establish_connection_pool;
use storehub::domain::auth::Role;
use storehub::domain::user::NewUser;
use storehub::forms::auth::PASSWORD_MIN_LEN;
use storehub::repository::{DieselRepository, RepositoryError, UserWriter};
use storehub::services::ServiceError;
use storehub::services::auth::hash_password;

#[derive(Parser)]
#[command(name = "storehub-admin")]
#[command(author, version, about = "Storehub administration tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a platform-wide SUPER_ADMIN account
    CreateSuperAdmin {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account password
        #[arg(long, env = "STOREHUB_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Debug, Error)]
enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("password must be at least {PASSWORD_MIN_LEN} characters long")]
    WeakPassword,
}

fn create_super_admin(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    let email = email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AdminError::InvalidEmail(email.to_string()));
    }
    if (password.chars().count() as u64) < PASSWORD_MIN_LEN {
        return Err(AdminError::WeakPassword);
    }

    let config = ServerConfig::from_env()?;
    let pool = establish_connection_pool(&config.database_url)?;
    let repo = DieselRepository::new(pool);

    let new_user = NewUser::new(
        None,
        name.trim(),
        email,
        hash_password(password)?,
        Role::SuperAdmin,
    );
    let user = repo.create_user(&new_user)?;

    log::info!("Created super admin {} ({})", user.email, user.id);
    Ok(user.id)
}

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::CreateSuperAdmin {
            email,
            name,
            password,
        } => create_super_admin(&email, &name, &password).map(|_| ()),
    };

    if let Err(e) = result {
        log::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
