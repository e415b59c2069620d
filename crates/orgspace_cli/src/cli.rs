use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "OrgSpace command-line probe", long_about = None)]
pub struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(short, long, value_name = "FILE", default_value = "orgspace.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check core linkage
    Ping,
    /// List entities visible in a view, newest first
    List {
        /// dashboard|projects|tasks|goals|notes|checklists|calendar|habits|custom
        #[arg(long, default_value = "dashboard")]
        view: String,
        /// Exact status match
        #[arg(long, default_value = "")]
        status: String,
        /// Exact priority match (low|medium|high)
        #[arg(long, default_value = "")]
        priority: String,
        /// Case-insensitive text over title, description and tags
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show dashboard statistics
    Stats,
    /// Create an entity
    Add {
        #[arg(value_name = "TITLE")]
        title: String,
        /// project|task|goal|note|checklist|habit|event|custom
        #[arg(short = 't', long = "type", default_value = "task")]
        kind: String,
        #[command(flatten)]
        fields: EntityFields,
    },
    /// Edit an entity; omitted fields keep their current value
    Edit {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        #[command(flatten)]
        fields: EntityFields,
    },
    /// Check or uncheck one checklist item (1-based position)
    ToggleItem {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(value_name = "POSITION")]
        position: usize,
    },
    /// Show one entity
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Delete one entity
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Uncheck every item of a checklist entity
    ResetChecklist {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Write an export snapshot into a directory
    Export {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
    /// Replace all entities from an export file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Optional entity fields shared by `add` and `edit`.
#[derive(Args)]
pub struct EntityFields {
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub status: Option<String>,
    /// low|medium|high
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Due date as YYYY-MM-DD; an empty value clears it
    #[arg(long = "due")]
    pub due_date: Option<String>,
    /// Hex color such as #6366f1
    #[arg(long)]
    pub color: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
    /// Checklist item text; repeat for several items (replaces the checklist)
    #[arg(long = "item", value_name = "TEXT")]
    pub items: Vec<String>,
}
