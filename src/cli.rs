//! Command-line surface of the `sm-store` binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use crate::clock::DayBoundary;
use crate::configuration::{BackendKind, Config, Overrides};
use crate::confessions::ConfessionStatus;
use crate::controller::Controller;
use crate::error_handling::types::{ControllerError, WebError};
use crate::web_interface::WebServer;

#[derive(Parser, Debug)]
#[command(name = "sm-store")]
#[command(version)]
#[command(about = "Confession feed and habit streak store for the student wellbeing platform")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, env = "SM_STORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storage backend, overrides `storage.backend`
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Directory for the file backend
    #[arg(long, env = "SM_STORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// SQLite file for the database backend
    #[arg(long, env = "SM_STORE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Calendar used to decide what "today" is for habit streaks
    #[arg(long, value_enum)]
    pub day_boundary: Option<DayBoundary>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Confession feed operations
    Confession {
        #[command(subcommand)]
        action: ConfessionCommand,
    },
    /// Habit tracker operations
    Habit {
        #[command(subcommand)]
        action: HabitCommand,
    },
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfessionCommand {
    /// Submit a confession; it stays pending until moderated
    Add {
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List approved confessions, newest first
    List {
        /// Include pending and rejected confessions
        #[arg(long)]
        all: bool,
        /// Only confessions in this moderation state
        #[arg(long, conflicts_with = "all")]
        status: Option<ConfessionStatus>,
    },
    Show { id: String },
    React { id: String, emoji: String },
    Comment { id: String, content: String },
    DeleteComment { id: String, comment_id: String },
    Moderate { id: String, status: ConfessionStatus },
    /// Distinct tags of approved confessions
    Tags,
}

#[derive(Subcommand, Debug)]
pub enum HabitCommand {
    Add { title: String },
    List,
    /// Mark the habit done today
    Tick { id: String },
    Delete { id: String },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        let port = match &self.command {
            Command::Serve { port } => *port,
            _ => None,
        };
        Overrides {
            backend: self.backend,
            data_dir: self.data_dir.clone(),
            db_path: self.db_path.clone(),
            port,
            day_boundary: self.day_boundary,
        }
    }
}

pub fn run(cli: Cli) -> Result<(), ControllerError> {
    let config = Config::load(cli.config.as_deref(), &cli.overrides())?;
    info!("Using {:?} storage backend", config.storage.backend);
    let controller = Controller::new(&config)?;

    match cli.command {
        Command::Confession { action } => run_confession(&controller, action),
        Command::Habit { action } => run_habit(&controller, action),
        Command::Serve { .. } => serve(controller, &config),
    }
}

fn run_confession(controller: &Controller, action: ConfessionCommand) -> Result<(), ControllerError> {
    let confessions = controller.confessions();
    match action {
        ConfessionCommand::Add { content, tags } => print_json(&controller.submit_confession(&content, &tags)?),
        ConfessionCommand::List { all, status } => match status {
            Some(status) => print_json(&confessions.list_by_status(status)),
            None => print_json(&confessions.list_confessions(all)),
        },
        ConfessionCommand::Show { id } => print_json(&controller.confession(&id)?),
        ConfessionCommand::React { id, emoji } => print_json(&controller.react(&id, &emoji)?),
        ConfessionCommand::Comment { id, content } => print_json(&controller.comment(&id, &content)?),
        ConfessionCommand::DeleteComment { id, comment_id } => {
            print_json(&controller.delete_comment(&id, &comment_id)?)
        }
        ConfessionCommand::Moderate { id, status } => print_json(&controller.moderate(&id, status)?),
        ConfessionCommand::Tags => print_json(&confessions.list_tags()),
    }
}

fn run_habit(controller: &Controller, action: HabitCommand) -> Result<(), ControllerError> {
    match action {
        HabitCommand::Add { title } => print_json(&controller.create_habit(&title)?),
        HabitCommand::List => print_json(&controller.habits().list_habits()),
        HabitCommand::Tick { id } => print_json(&controller.tick_habit(&id)?),
        HabitCommand::Delete { id } => {
            controller.delete_habit(&id)?;
            info!("Habit {} deleted", id);
            Ok(())
        }
    }
}

fn serve(controller: Controller, config: &Config) -> Result<(), ControllerError> {
    let addr = config.socket_addr()?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| WebError::StartFailed(format!("tokio runtime: {}", e)))?;
    let server = WebServer::new(Arc::new(controller));
    runtime.block_on(server.start(addr))?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ControllerError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| ControllerError::Output(e.to_string()))?;
    println!("{}", out);
    Ok(())
}
