// Kramer - terminal chat client for a PM agent running in a sprite
// Main entry point

use std::io;

use anyhow::Result;
use clap::Parser;

use kramer::cli::{display, open_stdin, Args, Session, SessionOptions, Spinner};
use kramer::clipboard::SystemClipboard;
use kramer::config::constants::MODEL_ENV_VAR;
use kramer::config::{load_config, model_display_name, validate_sandbox_name};
use kramer::logging;
use kramer::turn::{RemoteTarget, TurnExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(args.debug);

    if let Err(e) = validate_sandbox_name(&args.name) {
        eprintln!("  ❌ {}", e);
        std::process::exit(1);
    }

    // Load configuration, then let flags win
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let model = model_display_name(std::env::var(MODEL_ENV_VAR).ok().as_deref());

    let executor = TurnExecutor::new(RemoteTarget::new(config.remote_exec.as_str(), args.name.as_str()))
        .with_poll_interval(config.poll_interval());

    let mut stdout = io::stdout();
    display::header(&mut stdout, &args.name, &model)?;
    display::welcome(&mut stdout)?;

    let mut session = Session::new(
        executor,
        SystemClipboard::new(),
        stdout,
        Box::new(Spinner::new(config.spinner)),
        SessionOptions::from_config(&config),
    );

    let mut input = open_stdin()?;
    let code = session.run(input.as_mut()).await?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
