mod common;
mod config;
mod network;
mod ui;

use clap::Parser;
use common::{User, UserId};
use dotenvy::dotenv;
use network::{ChatClient, ServerEndpoint};
use tokio::sync::mpsc;
use ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "velo_chat",
    version,
    about = "Direct-message chat client"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Chat server base URL
    #[arg(long, env = "VELO_SERVER", value_name = "URL")]
    server: Option<String>,
    /// Local user id
    #[arg(long, env = "VELO_MY_ID", value_name = "ID")]
    my_id: Option<UserId>,
    /// Session cookie forwarded to the server
    #[arg(long, env = "VELO_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    app_config.apply_overrides(cli.server, cli.my_id, cli.session_cookie);

    let resolved = match app_config.resolve() {
        Ok(resolved) => resolved,
        Err(err) => {
            log::error!("Invalid configuration: {err}");
            return Ok(());
        }
    };

    let endpoint = ServerEndpoint::new(resolved.server_url, resolved.session_cookie);
    run_client(endpoint, resolved.my_id, resolved.users).await
}

async fn run_client(
    endpoint: ServerEndpoint,
    my_id: UserId,
    users: Vec<User>,
) -> Result<(), eframe::Error> {
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let client = ChatClient::new(endpoint, event_tx, cmd_rx);
        if let Err(err) = client.run().await {
            log::error!("Network client terminated: {err}");
        }
    });

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);
    let mut users = Some(users);

    eframe::run_native(
        "Velo Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");
            let users = users.take().unwrap_or_default();

            log::info!("Client started as user {my_id} with {} contacts", users.len());

            Ok(Box::new(ChatApp::new(cc, my_id, users, cmd_tx.clone(), event_receiver)))
        }),
    )
}
