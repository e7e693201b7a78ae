//! Command-line front end for the Moon user service.
//!
//! Stands in for the visual layer: it consumes `SessionService` snapshots,
//! applies the same route-guard decision a UI would, and is the only place
//! errors become user-visible text.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use moon_client::config::ClientConfig;
use moon_client::net::api::{ApiClient, UserApi};
use moon_client::net::error::ApiError;
use moon_client::net::types::ProfileUpdate;
use moon_client::state::auth::SessionService;
use moon_client::state::token::FileTokenStore;
use moon_client::util::auth::{RouteDecision, route_decision};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("not signed in; run `moon login` first")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "moon", about = "Moon user-service CLI")]
struct Cli {
    #[arg(long, env = "MOON_BASE_URL", default_value = moon_client::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// File holding the bearer token between invocations.
    #[arg(long, env = "MOON_TOKEN_FILE", default_value = ".moon_token")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account. Does not sign in.
    Signup {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        nickname: String,
    },
    /// Sign in and store the issued token.
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and clear the stored token.
    Logout,
    /// Exchange the stored token for a fresh one.
    Refresh,
    Profile(ProfileCommand),
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    /// Print the authenticated user's profile.
    Show,
    /// Edit profile fields; omitted flags keep their current value.
    Update {
        #[arg(long)]
        nickname: Option<String>,
        /// Milliseconds since the Unix epoch.
        #[arg(long)]
        birthday: Option<i64>,
        #[arg(long)]
        about_me: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    config.base_url = cli.base_url.trim_end_matches('/').to_string();

    let tokens = Arc::new(FileTokenStore::new(cli.token_file));
    let api = Arc::new(ApiClient::new(&config, tokens.clone())?);
    let session = SessionService::new(api.clone(), tokens);

    match cli.command {
        Command::Signup { email, password, confirm_password, nickname } => {
            session.register(&email, &password, &confirm_password, &nickname).await?;
            println!("Account created for {email}. Sign in with `moon login`.");
        }
        Command::Login { email, password } => {
            session.login(&email, &password).await?;
            let nickname = session.state().await.user.map_or(email, |user| user.nickname);
            println!("Logged in as {nickname}.");
        }
        Command::Logout => {
            session.logout().await?;
            println!("Logged out.");
        }
        Command::Refresh => {
            api.refresh_token().await?;
            println!("Token refreshed.");
        }
        Command::Profile(profile) => match profile.command {
            ProfileSubcommand::Show => {
                require_session(&session).await?;
                print_profile(&session).await;
            }
            ProfileSubcommand::Update { nickname, birthday, about_me, phone } => {
                require_session(&session).await?;
                let update = ProfileUpdate { nickname, birthday, about_me, phone };
                session.update_profile(update).await?;
                print_profile(&session).await;
            }
        },
    }

    Ok(())
}

/// Resolve the stored token into a live session, the way a UI route guard
/// would before rendering protected content.
async fn require_session(session: &SessionService) -> Result<(), CliError> {
    session.check_auth().await;
    match route_decision(&session.state().await) {
        RouteDecision::Render => Ok(()),
        RouteDecision::Loading | RouteDecision::RedirectToLogin => Err(CliError::NotSignedIn),
    }
}

async fn print_profile(session: &SessionService) {
    let Some(user) = session.state().await.user else {
        return;
    };
    println!("id:       {}", user.id);
    println!("email:    {}", user.email);
    println!("nickname: {}", user.nickname);
    println!("birthday: {}", user.birthday);
    println!("about me: {}", user.about_me);
    println!("phone:    {}", user.phone);
}
