use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;

use commands::{Backend, CliResult};

#[derive(Parser)]
#[command(name = "potatoclock", version, about = "Potato Clock CLI")]
struct Cli {
    /// State holder URL (defaults to client.base_url)
    #[arg(long, global = true)]
    server: Option<String>,
    /// Edit the saved session directly instead of talking to a server
    #[arg(long, global = true, conflicts_with = "server")]
    local: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current snapshot as JSON
    State {
        /// Include events newer than this sequence number
        #[arg(long, default_value = "0")]
        since: u64,
    },
    /// Follow the countdown, printing a line per update
    Watch {
        /// Stop after this many polls
        #[arg(long)]
        count: Option<u64>,
        /// Poll interval in milliseconds (defaults to client.poll_interval_ms)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Put a task in focus
    Focus {
        /// Task ID
        task_id: String,
    },
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Garden status and planting
    Garden {
        #[command(subcommand)]
        action: commands::garden::GardenAction,
    },
    /// Rest-time suggestions
    Rest {
        #[command(subcommand)]
        action: commands::rest::RestAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn run(cli: Cli) -> CliResult {
    let connect = || Backend::connect(cli.server.as_deref(), cli.local);
    match cli.command {
        Commands::State { since } => commands::state::show(&connect()?, since),
        Commands::Watch { count, interval_ms } => {
            commands::state::watch(&connect()?, count, interval_ms)
        }
        Commands::Task { action } => commands::task::run(&connect()?, action),
        Commands::Focus { task_id } => commands::task::focus(&connect()?, task_id),
        Commands::Timer { action } => commands::timer::run(&connect()?, action),
        Commands::Garden { action } => commands::garden::run(&connect()?, action),
        Commands::Rest { action } => commands::rest::run(&connect()?, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "potatoclock",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
