//! Spellbook - interactive spell slot and spell list manager.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spellbook_engine::api::{parse_command, Command, Repl};
use spellbook_engine::infrastructure::config::AppConfig;
use spellbook_engine::use_cases::Notice;
use spellbook_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Logs go to stderr so they do not interleave with command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spellbook_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        data_source = ?config.data_source,
        enforce_slot_cap = config.enforce_slot_cap,
        "Starting Spellbook"
    );

    let app = Arc::new(App::from_config(&config).await?);
    let repl = Repl::new(app);

    println!("Spellbook ready. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", Notice::warning(e.to_string()));
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match repl.execute(command).await {
            Ok(output) => {
                for line in output {
                    println!("{}", line);
                }
            }
            Err(notice) => println!("{}", notice),
        }
    }

    tracing::info!("Spellbook stopped");
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
