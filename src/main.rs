use clap::Parser;
use tracing_subscriber::EnvFilter;

use acctmgr::cli::output;
use acctmgr::cli::prompt::LinePrompt;
use acctmgr::cli::repl::{ExitReason, Repl};
use acctmgr::cli::{prompt_new_password, prompt_password, vault_path, Cli};
use acctmgr::clipboard::ArboardSink;
use acctmgr::config::Settings;
use acctmgr::crypto::memlock;
use acctmgr::errors::Result;
use acctmgr::idle::LockRequest;
use acctmgr::vault::Session;

/// Log to stderr; stdout belongs to the command loop.
fn init_logging() {
    let filter = EnvFilter::try_from_env("ACCTMGR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Err(e) = memlock::disable_core_dumps() {
        tracing::warn!(error = %e, "could not disable core dumps");
    }

    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    cli.apply_overrides(&mut settings);

    let path = vault_path(cli, &settings, &cwd);
    output::info(&format!("Vault: {}", path.display()));

    let mut session = Session::new(&path);
    if session.vault_exists() {
        let password = prompt_password()?;
        output::info("Deriving key (this may take a moment)...");
        session.open(password.as_bytes())?;
    } else {
        output::info("Creating new vault.");
        let password = prompt_new_password()?;
        output::info("Deriving key (this may take a moment)...");
        session.create(password.as_bytes())?;
        output::success(&format!("Created {}", path.display()));
    }

    let lock_request = LockRequest::from_signals().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not install signal handlers");
        LockRequest::new()
    });

    let mut prompt = LinePrompt::stdin();
    let mut clipboard = ArboardSink::new(settings.clipboard_clear());

    let reason = Repl::new(&mut session, &mut prompt, &mut clipboard)
        .idle_timeout(settings.idle_timeout())
        .lock_request(lock_request)
        .clipboard_clear(settings.clipboard_clear())
        .generated_len(settings.generated_password_len)
        .run()?;

    if reason == ExitReason::LockRequested {
        output::info("Interrupted.");
    }
    output::success("Vault locked, memory cleared.");
    Ok(())
}
