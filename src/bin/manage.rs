//! TaskFlow management utility.
//!
//! ```bash
//! manage migrate
//! manage createsuperuser --email admin@taskflow.dev --first-name Admin --last-name User
//! manage runserver
//! manage check
//! ```

use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taskflow::apps::auth::models::NewUser;
use taskflow::apps::auth::serializers::validate_password_policy;
use taskflow::apps::auth::{Argon2Hasher, PasswordHasher, User};
use taskflow::apps::notifications::LiveSessions;
use taskflow::config::settings::Settings;
use taskflow::config::state::AppState;
use taskflow::config::urls::build_handler;
use taskflow_core::permissions::UserRole;
use taskflow_http::{HttpServer, ShutdownCoordinator, shutdown_signal};
use taskflow_websockets::{ChannelRegistry, LiveServer};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "TaskFlow management utility", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Apply migrations, then serve the HTTP API and the live channel
	Runserver {
		/// Skip applying pending migrations on startup
		#[arg(long)]
		no_migrate: bool,
	},

	/// Apply pending database migrations
	Migrate,

	/// Create an administrator account
	Createsuperuser {
		#[arg(long)]
		email: String,

		#[arg(long, env = "TASKFLOW_SUPERUSER_PASSWORD", hide_env_values = true)]
		password: String,

		#[arg(long, default_value = "Admin")]
		first_name: String,

		#[arg(long, default_value = "User")]
		last_name: String,
	},

	/// Validate settings and database connectivity
	Check,
}

fn init_tracing(verbosity: u8) {
	let default = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn runserver(settings: Settings, no_migrate: bool) -> anyhow::Result<()> {
	let pool = taskflow::db::connect_with_settings(&settings)
		.await
		.context("failed to open database")?;
	if !no_migrate {
		taskflow::db::migrate(&pool).await.context("failed to apply migrations")?;
	}

	let registry = ChannelRegistry::new();
	let state = AppState::from_settings(pool.clone(), &settings, Arc::new(registry.clone()));
	let sessions = Arc::new(LiveSessions::new(pool, state.jwt.clone()));
	let handler = build_handler(state, &settings.cors_origin);

	let http_listener = TcpListener::bind(settings.http_addr())
		.await
		.with_context(|| format!("failed to bind {}", settings.http_addr()))?;
	let ws_listener = TcpListener::bind(settings.ws_addr())
		.await
		.with_context(|| format!("failed to bind {}", settings.ws_addr()))?;

	let coordinator = ShutdownCoordinator::new();
	let signal = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		signal.shutdown();
	});

	let http = HttpServer::new(handler).serve(http_listener, coordinator.clone());
	let live_shutdown = coordinator.clone();
	let live = LiveServer::new(registry, sessions).serve(ws_listener, async move { live_shutdown.wait().await });

	let (http_result, live_result) = tokio::join!(http, live);
	http_result.context("HTTP server failed")?;
	live_result.context("live channel server failed")?;
	tracing::info!("shutdown complete");
	Ok(())
}

async fn migrate(settings: Settings) -> anyhow::Result<()> {
	let pool = taskflow::db::connect_with_settings(&settings).await?;
	taskflow::db::migrate(&pool).await?;
	println!("Migrations applied");
	Ok(())
}

async fn createsuperuser(
	settings: Settings,
	email: String,
	password: String,
	first_name: String,
	last_name: String,
) -> anyhow::Result<()> {
	if let Err(err) = validate_password_policy(&password) {
		anyhow::bail!("{}", err.message.unwrap_or_default());
	}

	let pool = taskflow::db::connect_with_settings(&settings).await?;
	taskflow::db::migrate(&pool).await?;
	if User::find_by_email(&pool, &email).await?.is_some() {
		anyhow::bail!("a user with email {} already exists", email);
	}

	let password_hash = Argon2Hasher::new().hash(&password)?;
	let user = User::create(
		&pool,
		NewUser {
			email: &email,
			password_hash: &password_hash,
			first_name: &first_name,
			last_name: &last_name,
			role: UserRole::Admin,
		},
	)
	.await?;
	println!("Superuser created: {} ({})", user.email, user.id);
	Ok(())
}

async fn check(settings: Settings) -> anyhow::Result<()> {
	let pool = taskflow::db::connect_with_settings(&settings).await?;
	sqlx::query("SELECT 1").execute(&pool).await?;
	println!(
		"OK: environment {:?}, HTTP on {}, live channel on {}",
		settings.environment,
		settings.http_addr(),
		settings.ws_addr()
	);
	Ok(())
}

#[tokio::main]
async fn main() {
	dotenv::dotenv().ok();
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let settings = match Settings::from_env() {
		Ok(settings) => settings,
		Err(err) => {
			eprintln!("Configuration error: {}", err);
			process::exit(2);
		}
	};

	let result = match cli.command {
		Commands::Runserver { no_migrate } => runserver(settings, no_migrate).await,
		Commands::Migrate => migrate(settings).await,
		Commands::Createsuperuser {
			email,
			password,
			first_name,
			last_name,
		} => createsuperuser(settings, email, password, first_name, last_name).await,
		Commands::Check => check(settings).await,
	};

	if let Err(err) = result {
		eprintln!("Error: {:#}", err);
		process::exit(1);
	}
}
