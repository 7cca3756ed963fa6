use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use viber_driver::channels::viber::{signature, OutgoingMessage, ViberConfig, ViberDriver};
use viber_driver::channels::Inbound;

#[derive(Parser)]
#[command(name = "viber")]
#[command(about = "Viber driver CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook gateway. Logs every verified callback; registers channels.viber.webhookUrl when set.
    Gateway {
        /// Config file path (default: VIBER_CONFIG_PATH or ~/.viber-driver/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,

        /// Reply to every text message with the same text.
        #[arg(long)]
        echo: bool,
    },

    /// Print the bot account info (get_account_info).
    Account {
        /// Config file path (default: VIBER_CONFIG_PATH or ~/.viber-driver/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Send a text message to a Viber user id.
    Send {
        /// Config file path (default: VIBER_CONFIG_PATH or ~/.viber-driver/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Receiver user id.
        #[arg(long)]
        to: String,

        #[arg(long)]
        text: String,

        /// Sender display name shown in Viber (sender.name).
        #[arg(long)]
        sender_name: Option<String>,
    },

    /// Print a user's profile (get_user_details).
    User {
        /// Config file path (default: VIBER_CONFIG_PATH or ~/.viber-driver/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        #[arg(long)]
        id: String,
    },

    /// Print the X-Viber-Content-Signature value for a request body file.
    Sign {
        /// Auth token used as the HMAC key.
        #[arg(long)]
        token: String,

        /// File holding the exact request body.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("viber {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Gateway { config, port, echo }) => run_gateway(config, port, echo).await,
        Some(Commands::Account { config }) => run_account(config).await,
        Some(Commands::Send {
            config,
            to,
            text,
            sender_name,
        }) => run_send(config, to, text, sender_name).await,
        Some(Commands::User { config, id }) => run_user(config, id).await,
        Some(Commands::Sign { token, file }) => run_sign(token, file),
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load_viber_config(config_path: Option<PathBuf>) -> anyhow::Result<ViberConfig> {
    let (config, path) = viber_driver::config::load_config(config_path)?;
    resolve_viber(&config, &path)
}

fn resolve_viber(
    config: &viber_driver::config::Config,
    path: &std::path::Path,
) -> anyhow::Result<ViberConfig> {
    viber_driver::config::resolve_viber_config(config).ok_or_else(|| {
        anyhow::anyhow!(
            "viber auth token not configured; set channels.viber.authToken in {} or VIBER_AUTH_TOKEN",
            path.display()
        )
    })
}

async fn run_gateway(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    echo: bool,
) -> anyhow::Result<()> {
    let (mut config, path) = viber_driver::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    let viber = resolve_viber(&config, &path)?;
    let (inbound_tx, mut inbound_rx) = tokio::sync::mpsc::channel::<Inbound>(64);

    let echo_config = viber.clone();
    tokio::spawn(async move {
        let driver = ViberDriver::new(echo_config, reqwest::Client::new());
        while let Some(item) = inbound_rx.recv().await {
            match item {
                Inbound::Event(event) => {
                    log::info!("viber event: {}", event.name().unwrap_or("unknown"));
                }
                Inbound::Message(message) => {
                    log::info!("viber message from {}: {}", message.sender, message.text);
                    if echo {
                        let reply = OutgoingMessage::text(message.text.clone());
                        let extra = serde_json::json!({ "sender": { "name": "echo" } });
                        let extra = extra.as_object().cloned().unwrap_or_default();
                        match driver.reply(&reply, &message, &extra).await {
                            Ok(res) if res.status().is_success() => {}
                            Ok(res) => log::warn!("echo reply failed: {}", res.status()),
                            Err(e) => log::warn!("echo reply failed: {}", e),
                        }
                    }
                }
            }
        }
    });

    log::info!(
        "starting gateway on {}:{}",
        config.gateway.bind,
        config.gateway.port
    );
    viber_driver::gateway::run_gateway(config, viber, inbound_tx).await
}

async fn run_account(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let driver = ViberDriver::new(load_viber_config(config_path)?, reqwest::Client::new());
    let bot = driver.bot_identity().await?;
    println!("{}", serde_json::to_string_pretty(&bot.raw)?);
    Ok(())
}

async fn run_send(
    config_path: Option<PathBuf>,
    to: String,
    text: String,
    sender_name: Option<String>,
) -> anyhow::Result<()> {
    let driver = ViberDriver::new(load_viber_config(config_path)?, reqwest::Client::new());
    let mut extra = serde_json::Map::new();
    if let Some(name) = sender_name {
        extra.insert("sender".to_string(), serde_json::json!({ "name": name }));
    }
    let payload = viber_driver::channels::viber::build_outbound_payload(
        &OutgoingMessage::text(text),
        &to,
        &extra,
    );
    let res = driver.send_payload(&payload).await?;
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("send_message failed: {} {}", status, body);
    }
    println!("{}", body);
    Ok(())
}

async fn run_user(config_path: Option<PathBuf>, id: String) -> anyhow::Result<()> {
    let driver = ViberDriver::new(load_viber_config(config_path)?, reqwest::Client::new());
    let user = driver.get_user_by_id(&id).await?;
    println!("{}", serde_json::to_string_pretty(&user.info)?);
    Ok(())
}

fn run_sign(token: String, file: PathBuf) -> anyhow::Result<()> {
    let body = std::fs::read(&file)
        .with_context(|| format!("reading request body from {}", file.display()))?;
    println!("{}", signature::sign(&body, &token));
    Ok(())
}
