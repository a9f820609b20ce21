use clap::Parser;

use viralflow::cli::{self, Args, Command, ConfigAction};
use viralflow::config::Config;

/// Load .env file
///
/// Loads environment variables from .env file in the project root.
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Warn up front when a command needs the gateway and no key is configured.
fn check_api_key(config: &Config) {
    let var = &config.gemini.api_key_env;
    if std::env::var(var).map(|v| v.is_empty()).unwrap_or(true) {
        eprintln!("Warning: {} environment variable not set.", var);
        eprintln!("         Set {} in .env or environment to use Gemini.\n", var);
    }
}

fn run(args: Args) -> Result<(), String> {
    // init must work before the file it creates exists
    if let Command::Config {
        action: ConfigAction::Init,
    } = &args.command
    {
        return cli::handle_config_action(&Config::default(), args.config.as_deref(), ConfigAction::Init);
    }
    let config = Config::load(args.config.as_deref()).map_err(|e| e.to_string())?;

    match args.command {
        Command::Playbooks => {
            cli::list_playbooks();
            Ok(())
        }
        Command::Generate(generate) => {
            check_api_key(&config);
            cli::run_generate(&config, generate)
        }
        Command::Analyze { url } => {
            check_api_key(&config);
            cli::run_analyze(&config, url)
        }
        Command::Optimize { session, select } => {
            check_api_key(&config);
            cli::run_optimize(&config, session, select)
        }
        Command::Video {
            session,
            timeout,
            reuse,
            out,
        } => {
            check_api_key(&config);
            cli::run_video(&config, session, timeout, reuse, out)
        }
        Command::Export {
            session,
            kind,
            frames,
            part,
            out,
        } => cli::run_export(&config, session, kind, frames, part, out),
        Command::Config { action } => {
            cli::handle_config_action(&config, args.config.as_deref(), action)
        }
    }
}

fn main() {
    // Load .env file before anything else
    load_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
