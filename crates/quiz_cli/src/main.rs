//! quizkit CLI: manage quizzes and take them from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quizkit", version, about = "Multi-page multiple-choice quizzes")]
struct Cli {
    /// Config file path (defaults to ./quizkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and a starter config
    Init,

    /// Import quizzes from a TOML fixture
    Load {
        /// Fixture file
        fixture: PathBuf,

        /// Username stamped as creator (staff only)
        #[arg(long = "as")]
        acting_user: Option<String>,
    },

    /// List live quizzes
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Take a quiz page by page
    Take {
        /// Quiz slug
        slug: String,

        /// Take the quiz as this registered user
        #[arg(long)]
        user: Option<String>,

        /// Email for anonymous attempts
        #[arg(long)]
        email: Option<String>,

        /// Resume a stored session
        #[arg(long)]
        session: Option<String>,

        /// Pre-selected choices (1-based, comma-separated, in question order)
        #[arg(long, value_delimiter = ',')]
        choices: Vec<usize>,
    },

    /// Register an account and claim earlier anonymous results
    Register {
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,

        #[arg(long)]
        staff: bool,
    },

    /// Show a recorded result
    Result {
        /// Quiz slug
        slug: String,

        /// Result id
        id: i64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Admin changelists and edits
    Admin {
        #[command(subcommand)]
        command: commands::admin::AdminCommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let overrides = config::Overrides {
        database: cli.database,
        log_dir: cli.log_dir,
        log_level: cli.log_level,
    };
    let settings = match config::load_config_from(cli.config.as_deref())
        .and_then(|file| config::Settings::resolve(file, overrides))
    {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    if let Err(e) = commands::start_logging(&settings) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = match cli.command {
        Commands::Init => commands::init::execute(&settings),
        Commands::Load {
            fixture,
            acting_user,
        } => commands::load::execute(&settings, fixture, acting_user),
        Commands::List { json } => commands::list::execute(&settings, json),
        Commands::Take {
            slug,
            user,
            email,
            session,
            choices,
        } => commands::take::execute(
            &settings,
            commands::take::TakeOptions {
                slug,
                user,
                email,
                session,
                choices,
            },
        ),
        Commands::Register {
            username,
            email,
            first_name,
            last_name,
            staff,
        } => commands::register::execute(
            &settings,
            quiz_core::NewUser {
                username,
                email,
                first_name,
                last_name,
                is_staff: staff,
            },
        ),
        Commands::Result { slug, id, json } => {
            commands::result::execute(&settings, &slug, id, json)
        }
        Commands::Admin { command } => commands::admin::execute(&settings, command),
    };

    if let Err(e) = result {
        log::error!("event=cli_command module=cli status=error error={e}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
