use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Set proxy
    #[arg(required = false, long, short = 'P', global = true)]
    pub proxy: Option<String>,

    /// Set request headers (key:value)
    #[arg(required = false, long, short = 'H', global = true)]
    pub header: Option<Vec<String>>,

    /// Set user agent
    #[arg(required = false, long, short = 'A', global = true)]
    pub user_agent: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every configured repository and rebuild the local index
    #[clap(name = "sync", visible_alias = "S")]
    Sync,

    /// Search the local index by name or keyword
    #[command(arg_required_else_help = true)]
    #[clap(name = "search", visible_alias = "s", visible_alias = "find")]
    Search {
        /// Search term (`*` lists everything)
        #[arg(required = true)]
        query: String,

        /// Maximum number of results to show
        #[arg(required = false, long, short)]
        limit: Option<usize>,
    },

    /// Show everything indexed about a package
    #[command(arg_required_else_help = true)]
    #[clap(name = "info", visible_alias = "query", visible_alias = "Q")]
    Info {
        /// Exact package name
        #[arg(required = true)]
        name: String,
    },

    /// Manage configured repositories
    #[command(arg_required_else_help = true)]
    #[clap(name = "repo")]
    Repo {
        #[clap(subcommand)]
        action: RepoAction,
    },

    /// Print the effective configuration
    Config,

    /// Write a default configuration file
    #[clap(name = "defconfig")]
    DefConfig,
}

#[derive(Subcommand)]
pub enum RepoAction {
    /// Add a repository, or replace the location of an existing one
    #[command(arg_required_else_help = true)]
    Add {
        /// Repository name
        name: String,

        /// Manifest location (URL, `//host/path` or `//.host/path`)
        location: String,
    },

    /// Remove a repository from the configuration
    #[command(arg_required_else_help = true)]
    #[clap(visible_alias = "rm")]
    Remove {
        /// Repository name
        name: String,
    },

    /// List configured repositories
    #[clap(visible_alias = "ls")]
    List,
}
