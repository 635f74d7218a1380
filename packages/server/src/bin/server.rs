//! SkillSync real-time relay server.
//!
//! Authenticated clients connect over WebSocket, join chat channels and exchange messages,
//! typing indicators, notifications, session updates and presence updates.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin skillsync-server
//! cargo run --bin skillsync-server -- --host 0.0.0.0 --port 3001 --client-url '*'
//! cargo run --bin skillsync-server -- issue-token --user-id u1 --email u1@example.com
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::{Parser, Subcommand};
use skillsync_server::{
    config::{DEV_JWT_SECRET, ServerConfig},
    domain::{Email, Identity, UserId},
    infrastructure::{
        auth::{DEFAULT_TOKEN_TTL_SECONDS, JwtTokenVerifier, ttl_seconds_from_hours},
        message_pusher::WebSocketMessagePusher,
        registry::InMemoryRoomRegistry,
    },
    ui::{AppState, Server},
};
use skillsync_shared::{logger::setup_logger, time::SystemClock};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "skillsync-server")]
#[command(about = "SkillSync real-time chat and notification relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "SKILLSYNC_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "SKILLSYNC_PORT", default_value = "8080")]
    port: u16,

    /// HS256 secret shared with the token issuer (at least 32 bytes)
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    jwt_secret: String,

    /// Browser origin allowed by CORS ('*' for any)
    #[arg(long, env = "CLIENT_URL", default_value = "http://localhost:3000")]
    client_url: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a signed token for local testing
    IssueToken {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        role: Option<String>,

        /// Validity in hours (defaults to 7 days)
        #[arg(long)]
        ttl_hours: Option<i64>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        &["skillsync_server", "skillsync_shared", "tower_http"],
        &args.log_level,
    );

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // issue-token only needs the signing secret
    if let Some(Command::IssueToken {
        user_id,
        email,
        role,
        ttl_hours,
    }) = args.command
    {
        let verifier = JwtTokenVerifier::new(&args.jwt_secret)?;
        let identity = Identity::new(UserId::new(user_id)?, Email::new(email)?);
        let ttl_seconds = match ttl_hours {
            Some(hours) => ttl_seconds_from_hours(hours)?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };
        println!("{}", verifier.issue(&identity, role.as_deref(), ttl_seconds)?);
        return Ok(());
    }

    let config = ServerConfig::new(args.host, args.port, args.jwt_secret, args.client_url)?;
    let verifier = Arc::new(JwtTokenVerifier::new(&config.jwt_secret)?);

    if config.uses_dev_secret() {
        tracing::warn!("Using the development JWT secret; set JWT_SECRET in production");
    }

    // Initialize dependencies in order:
    // 1. RoomRegistry
    // 2. MessagePusher
    // 3. AppState (UseCases)
    // 4. Server

    // 1. Create RoomRegistry (in-memory channel membership)
    let registry = Arc::new(InMemoryRoomRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher_connections = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(message_pusher_connections));

    // 3. Create UseCases
    let state = Arc::new(AppState::new(
        verifier,
        registry,
        message_pusher,
        Arc::new(SystemClock),
    ));

    // 4. Create and run the server
    Server::new(state, &config).run().await
}
