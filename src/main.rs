use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use prism_chat::app::App;
use prism_chat::controller::{ChatController, StoreOutcome, StoreRequest};
use prism_chat::{config, handler, tui, ui};
use prism_chat::{Config, MemoryStore, Message, MessageStore, RestStore};

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Tabbed terminal chat backed by a remote messages table")]
#[command(version)]
struct Cli {
    /// Keep messages in memory instead of the remote table
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the terminal UI (default)
    Tui,
    /// Print every stored message, oldest first
    List,
    /// Store a message and print the refreshed list
    Send {
        /// Message text
        text: String,
    },
    /// Save store connection settings
    Configure {
        /// Base URL of the project, e.g. https://xyz.supabase.co
        #[arg(long)]
        url: Option<String>,
        /// API key sent as `apikey` and bearer token
        #[arg(long)]
        key: Option<String>,
        /// Table holding the messages
        #[arg(long)]
        table: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Configure { url, key, table } => configure(url, key, table),
        command => {
            let store = open_store(cli.memory)?;
            match command {
                Commands::List => list_messages(store).await,
                Commands::Send { text } => send_message(store, &text).await,
                _ => run_tui(store).await,
            }
        }
    }
}

/// Log to a file; the terminal itself belongs to the UI
fn init_logging() -> Result<()> {
    let log_path = config::log_file_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false) // Disable ANSI colors in log file
        .init();

    Ok(())
}

fn open_store(memory: bool) -> Result<Arc<dyn MessageStore>> {
    if memory {
        info!("using in-memory message store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let settings = config.store_settings()?;
    info!(url = %settings.url, table = %settings.table, "using remote message store");

    Ok(Arc::new(
        RestStore::new(&settings.url, &settings.key).with_table(&settings.table),
    ))
}

async fn run_tui(store: Arc<dyn MessageStore>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let mut app = App::new(store, events.sender());
    app.start();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn list_messages(store: Arc<dyn MessageStore>) -> Result<()> {
    let mut controller = ChatController::new();
    load(&mut controller, store.as_ref(), StoreRequest::Refresh).await?;

    print_messages(controller.messages());
    Ok(())
}

async fn send_message(store: Arc<dyn MessageStore>, text: &str) -> Result<()> {
    let mut controller = ChatController::new();
    send_and_reload(&mut controller, store.as_ref(), text).await?;

    print_messages(controller.messages());
    Ok(())
}

/// Append `text`, then reload the list. Unlike the TUI, every store
/// failure along the way is returned to the caller.
async fn send_and_reload(
    controller: &mut ChatController,
    store: &dyn MessageStore,
    text: &str,
) -> Result<()> {
    controller.on_input_change(text);

    let request = controller
        .send()
        .ok_or_else(|| anyhow!("Refusing to send an empty message"))?;

    match load(controller, store, request).await? {
        Some(follow_up) => load(controller, store, follow_up).await.map(|_| ()),
        None => Ok(()),
    }
}

/// Run one store request and fold it into the controller, failing loudly
async fn load(
    controller: &mut ChatController,
    store: &dyn MessageStore,
    request: StoreRequest,
) -> Result<Option<StoreRequest>> {
    let outcome = request.run(store).await;
    match &outcome {
        StoreOutcome::Listed(Err(err)) => bail!("Failed to load messages: {err}"),
        StoreOutcome::Appended { result: Err(err), .. } => bail!("Failed to send message: {err}"),
        _ => Ok(controller.apply(outcome)),
    }
}

fn print_messages(messages: &[Message]) {
    if messages.is_empty() {
        println!("No messages yet.");
        return;
    }

    for msg in messages {
        println!("{}  💬 {}", msg.created_at.format("%Y-%m-%d %H:%M:%S"), msg.text);
    }
}

fn configure(url: Option<String>, key: Option<String>, table: Option<String>) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|_| Config::new());
    if url.is_none() && key.is_none() && table.is_none() {
        println!("Config file: {}", Config::get_config_path()?.display());
        println!("  store_url: {}", config.store_url.as_deref().unwrap_or("(unset)"));
        println!(
            "  store_key: {}",
            if config.store_key.is_some() { "(set)" } else { "(unset)" }
        );
        println!("  table:     {}", config.table.as_deref().unwrap_or("messages"));
        return Ok(());
    }

    if url.is_some() {
        config.store_url = url;
    }
    if key.is_some() {
        config.store_key = key;
    }
    if table.is_some() {
        config.table = table;
    }
    config.save()?;
    println!("Saved {}", Config::get_config_path()?.display());
    Ok(())
}
