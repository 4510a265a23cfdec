use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::entry::CollectionKind;

#[derive(Debug, Parser)]
#[command(
    name = "quickfix",
    about = "Keyword-matched quick fixes and field guides for equipment manuals"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage admin-curated quick fixes
    Fix {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Manage engineer-submitted quick guides
    Guide {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Find fixes and guides relevant to a fault description
    Search(SearchArgs),
    /// Write a collection to a JSON file
    Export(ExportArgs),
    /// Append entries from a JSON file to a collection
    Import(ImportArgs),
    /// Manage persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show system status and statistics
    Status(StatusArgs),
    /// Start MCP server for AI agent integration
    Mcp,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Entry subcommands (shared by fix and guide) --

#[derive(Debug, Subcommand)]
pub enum EntryAction {
    /// Add a new entry
    Add(AddArgs),
    /// Remove an entry by id (its id is never reused)
    Remove {
        /// Entry id, e.g. 12 or #12
        id: String,
    },
    /// List all entries
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single entry
    Show {
        /// Entry id, e.g. 12 or #12
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Short human-readable label
    #[arg(long)]
    pub title: String,

    /// The solution or instructions
    #[arg(long)]
    pub body: String,

    /// Equipment or panel name this entry applies to (repeatable)
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// Extra matchable keyword (repeatable); derived from the text if omitted
    #[arg(short = 'k', long = "keyword")]
    pub keywords: Vec<String>,

    /// Who wrote the entry (defaults to $USER)
    #[arg(long)]
    pub author: Option<String>,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The fault description or question
    pub query: String,

    /// Search only this collection (default: fixes, then guides)
    #[arg(short = 'k', long = "kind", value_enum)]
    pub collection: Option<CollectionKind>,

    /// Number of results per collection
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Return every matching entry
    #[arg(long)]
    pub all: bool,

    /// Score bonus for entries whose tag appears in the query
    #[arg(long)]
    pub tag_bonus: Option<usize>,

    /// Output results as JSON
    #[arg(long, conflicts_with = "ids")]
    pub json: bool,

    /// Output only entry references (one per line)
    #[arg(long)]
    pub ids: bool,
}

// -- Import / Export --

#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Collection to export
    #[arg(short = 'k', long = "kind", value_enum)]
    pub collection: CollectionKind,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// Collection to append to
    #[arg(short = 'k', long = "kind", value_enum)]
    pub collection: CollectionKind,

    /// JSON file holding an array of entries
    pub file: PathBuf,
}

// -- Config --

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the resolved value of every setting and where it came from
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Persist a setting (tag_bonus or limit)
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// Clear a stored setting (revert to default)
    Clear {
        /// Setting name
        key: String,
    },
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "quickfix",
            &mut std::io::stdout(),
        );
    }
}
