use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use chat_store::config::AppConfig;
use chat_store::db::establish_connection;
use chat_store::export::write_messages;
use chat_store::logging::{init_logging, OperationTimer};
use chat_store::metrics::MetricsCollector;
use chat_store::{ChatService, Database, NewMessage, NewRoom, OutputFormat};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (overrides configuration)
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Extra configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage rooms
    Room {
        #[command(subcommand)]
        command: RoomCommands,
    },
    /// Post and read messages
    Message {
        #[command(subcommand)]
        command: MessageCommands,
    },
    /// Show row counts
    Stats,
}

#[derive(Subcommand)]
enum RoomCommands {
    /// Create a room
    Create {
        /// Unique room name
        name: String,

        /// Status code
        #[arg(short, long)]
        status: Option<i32>,
    },
    /// Delete a room and all of its messages
    Delete {
        /// Room id
        id: i64,
    },
    /// Look a room up by name
    Show {
        /// Room name
        name: String,
    },
}

#[derive(Subcommand)]
enum MessageCommands {
    /// Post a message to a room
    Post {
        /// Room id
        #[arg(short, long)]
        room: i64,

        /// Sender display name
        #[arg(short, long)]
        user: String,

        /// Message text
        content: String,
    },
    /// Print the 30 most recent messages
    Recent {
        /// Restrict to one room
        #[arg(short, long)]
        room: Option<i64>,

        /// Output format (txt, csv or json)
        #[arg(short, long, default_value = "txt")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging
    let mut logging_config = config.logging.clone();
    logging_config.level = config.get_log_level();
    let _log_guard = init_logging(&logging_config)?;
    if let Err(e) = MetricsCollector::init() {
        warn!("Metrics disabled: {}", e);
    }

    info!("Starting chat-store");

    // Initialize database with configuration
    let mut database_config = config.database.clone();
    database_config.url = cli.database.clone().unwrap_or_else(|| config.get_database_url());
    let database_url = database_config.url.clone();
    let db = establish_connection(&database_config)
        .with_context(|| format!("Failed to open database at {database_url}"))?;
    MetricsCollector::default().update_connection_pool_size(config.database.max_connections);

    let service = ChatService::sqlite(&db);

    // Process command
    match cli.command {
        Commands::Room { command } => run_room_command(&service, command),
        Commands::Message { command } => run_message_command(&service, command),
        Commands::Stats => show_stats(&db),
    }
}

fn run_room_command(service: &ChatService, command: RoomCommands) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    match command {
        RoomCommands::Create { name, status } => {
            let mut new_room = NewRoom::new(name);
            new_room.status = status;
            let room = service.create_room(new_room)?;
            writeln!(stdout, "{}\t{}\t{}", room.id, room.name, room.status)?;
        }
        RoomCommands::Delete { id } => {
            let removed = service.delete_room(id)?;
            writeln!(stdout, "Deleted room {id} and {removed} message(s)")?;
        }
        RoomCommands::Show { name } => {
            let room = service
                .find_room(&name)?
                .ok_or_else(|| anyhow::anyhow!("Room not found: {}", name))?;
            writeln!(stdout, "{}\t{}\t{}", room.id, room.name, room.status)?;
        }
    }

    Ok(())
}

fn run_message_command(service: &ChatService, command: MessageCommands) -> Result<()> {
    match command {
        MessageCommands::Post { room, user, content } => {
            let message = service.post_message(NewMessage::new(user, room, content))?;
            writeln!(std::io::stdout().lock(), "{}\t{}", message.id, message.send_date)?;
        }
        MessageCommands::Recent { room, format } => {
            let output_format = format.parse::<OutputFormat>().unwrap_or_else(|e| {
                warn!("{}. Using txt as default.", e);
                OutputFormat::Txt
            });

            let timer = OperationTimer::new("recent_messages");
            let messages = service.recent_messages(room)?;
            timer.finish();

            if messages.is_empty() {
                warn!("No messages to write");
            }
            write_messages(&messages, output_format, std::io::stdout().lock())?;
        }
    }

    Ok(())
}

fn show_stats(db: &Database) -> Result<()> {
    let stats = db.get_stats()?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Rooms: {}", stats.rooms)?;
    writeln!(stdout, "Messages: {}", stats.messages)?;
    Ok(())
}
