// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CourseHub command-line shell.
//!
//! Restores the saved session, runs one command against it, and exits.

use clap::{Parser, Subcommand, ValueEnum};
use coursehub_client::{
    config::Config,
    error::AppError,
    models::RegistrationRole,
    routes::{NavTarget, Resolution},
    session::Session,
    AppContext,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coursehub", version, about = "CourseHub marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the signed-in user
    Whoami,
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        email: String,
        #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },
    /// Sign in with a Google ID token
    GoogleLogin {
        id_token: String,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },
    /// Sign out
    Logout,
    /// Re-fetch the signed-in user's profile
    Refresh,
    /// Resolve a path to the view that would be shown
    Open { path: String },
    /// List the navigation menu
    Nav,
    /// Request a password reset email
    ForgotPassword { email: String },
    /// Set a new password using a reset token
    ResetPassword {
        token: String,
        #[arg(long, env = "COURSEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Instructor,
}

impl From<RoleArg> for RegistrationRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => RegistrationRole::Student,
            RoleArg::Instructor => RegistrationRole::Instructor,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing::debug!(api = %config.api_base_url, "Starting CourseHub client");
    let ctx = AppContext::from_config(config)?;

    if let Err(e) = run(&ctx, cli.command).await {
        eprintln!("{}", e.user_message());
        tracing::debug!(error = %e, "Command failed");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(ctx: &AppContext, command: Command) -> Result<(), AppError> {
    let store = &ctx.session;

    match command {
        Command::Whoami => print_session(&store.snapshot()),
        Command::Login { email, password } => {
            print_session(&store.login(&email, &password).await?);
        }
        Command::Register {
            first_name,
            last_name,
            email,
            password,
            role,
        } => {
            let session = store
                .register(
                    &first_name,
                    &last_name,
                    &email,
                    &password,
                    role.map(Into::into),
                )
                .await?;
            print_session(&session);
        }
        Command::GoogleLogin { id_token, role } => {
            let session = store
                .login_with_google(&id_token, role.map(Into::into))
                .await?;
            print_session(&session);
        }
        Command::Logout => {
            store.logout().await;
            println!("Signed out");
        }
        Command::Refresh => {
            store.refresh_profile().await?;
            print_session(&store.snapshot());
        }
        Command::Open { path } => match ctx.router.open(&path) {
            Resolution::Defer => println!("loading"),
            Resolution::Render(route) => println!("render {}", route),
            Resolution::Redirect(route) => println!("redirect {}", route),
        },
        Command::Nav => {
            for item in ctx.router.navigation() {
                match item.target {
                    NavTarget::Route(route) => println!("{:<18} {}", item.label, route),
                    NavTarget::Logout => println!("{:<18} (action)", item.label),
                }
            }
        }
        Command::ForgotPassword { email } => {
            store.forgot_password(&email).await?;
            println!("If the address is registered, a reset email is on its way");
        }
        Command::ResetPassword { token, password } => {
            store.reset_password(&token, &password).await?;
            println!("Password updated");
        }
    }
    Ok(())
}

fn print_session(session: &Session) {
    match session.user() {
        Some(user) => println!("{} <{}> [{}]", user.display_name(), user.email, user.role),
        None => println!("Not signed in"),
    }
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coursehub_client=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
