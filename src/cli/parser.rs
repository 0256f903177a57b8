use crate::config::BackendMode;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for rTimeTracker
#[derive(Parser)]
#[command(
    name = "rtimetracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track time per task, keep it in SQLite and sync it with a server",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the configured sync backend
    #[arg(global = true, long = "backend", value_enum)]
    pub backend: Option<BackendMode>,

    /// Override the sync server URL
    #[arg(global = true, long = "server")]
    pub server: Option<String>,

    /// JSON file backing the simulated server
    #[arg(global = true, long = "sim-store", hide = true)]
    pub sim_store: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ServerAction {
    /// Check that the backend answers
    Health,
    /// Fill the server with 30 days of sample tasks
    Seed,
    /// Remove every task from the server
    Clear,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Report keys missing from the configuration file")]
        check: bool,

        #[arg(long = "edit", help = "Edit the configuration file (default editor: $EDITOR)")]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a task in a session
    Add {
        /// Task name
        name: String,

        /// Session date (YYYY-MM-DD, default today)
        #[arg(long = "date")]
        date: Option<String>,
    },

    /// Add a subtask under a task or subtask
    Sub {
        /// Parent task id
        parent: String,

        /// Subtask name
        name: String,
    },

    /// List the tasks of a session (pulls new server tasks first)
    List {
        #[arg(long = "date", help = "Session date (YYYY-MM-DD, default today)")]
        date: Option<String>,

        #[arg(long = "prev", conflicts_with = "next", help = "Show the day before --date")]
        prev: bool,

        #[arg(long = "next", help = "Show the day after --date")]
        next: bool,

        #[arg(long = "json", help = "Print the session as JSON")]
        json: bool,
    },

    /// Start the timer on a task (id or name; unknown names create a task)
    Start {
        task: String,

        #[arg(long = "date")]
        date: Option<String>,
    },

    /// Stop the running timer and commit its time
    Stop,

    /// Show the running timer
    Status,

    /// Run a live timer in the foreground until Ctrl-C
    Track {
        task: String,

        #[arg(long = "date")]
        date: Option<String>,
    },

    /// Set the duration of a task or subtask (SS, MM:SS or H:MM:SS)
    Edit {
        id: String,

        #[arg(long = "duration")]
        duration: String,
    },

    /// Rename a task (server-known tasks are split into a new task)
    Rename { id: String, name: String },

    /// Delete a task or subtask
    Del {
        id: String,

        #[arg(long = "yes", short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Upload one task to the server
    Push { id: String },

    /// Replace the local copy of a task with the server's
    Pull {
        id: String,

        #[arg(long = "yes", short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Upload every missing / inconsistent task of a session
    Upload {
        #[arg(long = "date")]
        date: Option<String>,

        #[arg(long = "all", help = "Upload every candidate without asking")]
        all: bool,

        #[arg(long = "ids", value_delimiter = ',', help = "Upload only these ids")]
        ids: Vec<String>,
    },

    /// Export tasks to a file
    Export {
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long = "date", conflicts_with = "all")]
        date: Option<String>,

        #[arg(long = "all", help = "Export every session")]
        all: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Import tasks from an exported JSON file
    Import {
        #[arg(long, value_name = "FILE")]
        file: String,
    },

    /// Server maintenance
    Server {
        #[arg(value_enum)]
        action: ServerAction,
    },
}
