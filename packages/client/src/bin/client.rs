//! Command-line chat client for the SkillSync relay.
//!
//! Connects with a signed token, then reads commands from the prompt (`/join`, `/msg`,
//! `/notify`, ...; type `/help`). Incoming events are printed one per block.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//! A rejected token exits immediately.
//!
//! Run with:
//! ```not_rust
//! TOKEN=$(cargo run --bin skillsync-server -- issue-token --user-id u1 --email u1@example.com)
//! cargo run --bin skillsync-client -- --token "$TOKEN"
//! ```

use clap::Parser;

use skillsync_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "skillsync-client")]
#[command(about = "Command-line chat client for the SkillSync relay", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Signed token identifying the user
    #[arg(short = 't', long, env = "SKILLSYNC_TOKEN", hide_env_values = true)]
    token: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&["skillsync_client"], "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = skillsync_client::run_client(args.url, args.token).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
