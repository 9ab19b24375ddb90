use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use git_phpcs::{Config, Outcome, RefSelection, render::render};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "git-phpcs")]
#[command(about = "Report PHP_CodeSniffer violations on changed lines only")]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    check: CheckArgs,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print shell completions
    Completions { shell: Shell },
    /// Print the man page
    Man,
}

#[derive(Args)]
struct CheckArgs {
    /// Check uncommitted changes against HEAD
    #[arg(long)]
    changes: bool,

    /// Compare the branches on origin
    #[arg(long)]
    origin: bool,

    /// Coding standards to check against (defaults to ~/standard.phpcs)
    #[arg(long)]
    standard: Option<String>,

    /// Sniffs to exclude (defaults to ~/exclude.phpcs)
    #[arg(long)]
    exclude: Option<String>,

    /// Branch to check (defaults to the checked-out branch)
    #[arg(long)]
    current_branch: Option<String>,

    /// Branch to compare against (defaults to the fork point of --fork-base)
    #[arg(long)]
    base_branch: Option<String>,

    /// Branch whose fork point is the default base
    #[arg(long, default_value = git_phpcs::config::DEFAULT_FORK_BASE)]
    fork_base: String,

    /// phpcs executable (defaults to vendor/bin/phpcs, then phpcs on PATH)
    #[arg(long, env = "PHPCS")]
    phpcs: Option<PathBuf>,

    /// Read the changes from a diff file instead of git ("-" for stdin)
    #[arg(long, value_name = "FILE", conflicts_with_all = ["changes", "origin", "current_branch", "base_branch"])]
    diff: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl CheckArgs {
    fn config(&self) -> Config {
        Config {
            refs: RefSelection {
                changes: self.changes,
                origin: self.origin,
                current_branch: self.current_branch.clone(),
                base_branch: self.base_branch.clone(),
                fork_base: self.fork_base.clone(),
            },
            standard: self.standard.clone(),
            exclude: self.exclude.clone(),
            phpcs: self.phpcs.clone(),
        }
        .with_dotfiles(dirs::home_dir().as_deref())
    }

    fn patch(&self) -> io::Result<Option<String>> {
        match self.diff.as_deref() {
            None => Ok(None),
            Some(path) if path.as_os_str() == "-" => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(Some(text))
            }
            Some(path) => fs::read_to_string(path).map(Some),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("git-phpcs: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "git-phpcs", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Man) => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
        None => check(&cli.check),
    }
}

fn check(args: &CheckArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = args.config();
    let patch = args.patch()?;
    let dir = std::env::current_dir()?;

    let outcome = git_phpcs::run(&config, &dir, patch.as_deref())?;

    let color = !args.no_color && io::stdout().is_terminal();
    print!("{}", render(&outcome, color));

    Ok(match outcome {
        Outcome::Violations(_) => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    })
}
