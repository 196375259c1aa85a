//! Text2SQL Client Binary
//!
//! Interactive terminal front end for the inference service.
//!
//! ## Usage
//!
//! ```bash
//! # Connect to local server
//! cargo run --bin text2sql-client
//!
//! # Connect to remote server
//! cargo run --bin text2sql-client -- --server http://192.168.1.100:8000
//! ```

use std::time::Duration;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use text2sql::client::command::HELP;
use text2sql::client::{render_answer, ApiClient, Command, SchemaPanel, SubmitOutcome};
use text2sql::logging::init_tracing;
use text2sql::Config;

/// Terminal client for the text-to-SQL service
#[derive(Parser, Debug)]
#[command(name = "text2sql-client", version, about, long_about = None)]
struct Args {
    /// Server URL (overrides client.server)
    #[arg(short, long)]
    server: Option<String>,

    /// Request timeout in seconds (overrides client.timeout_secs)
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Configuration file (default: config.toml + config.local.toml)
    #[arg(short, long)]
    config: Option<String>,
}

struct ReplState {
    api: ApiClient,
    schema: Option<String>,
    panel: SchemaPanel,
}

impl ReplState {
    fn prompt(&self) -> String {
        let selected = self.panel.selected_names().len();
        format!("text2sql [{selected}/{}]> ", self.panel.len())
    }

    /// Fetch the schema and rebuild the panel; the previous selection is dropped.
    async fn reload(&mut self) {
        match self.api.database_schema().await {
            Ok(response) if response.is_success() => {
                let schema = response.schema.unwrap_or_default();
                self.panel = SchemaPanel::parse(&schema);
                self.schema = Some(schema);
                println!("Loaded {} table(s). Use .tables and .toggle to select.", self.panel.len());
            }
            Ok(response) => {
                println!(
                    "Error: {}",
                    response.error.unwrap_or_else(|| "schema unavailable".to_string())
                );
            }
            Err(e) => println!("{e}"),
        }
    }

    fn print_tables(&self) {
        if self.panel.is_empty() {
            println!("No tables loaded. Use .reload to fetch the schema.");
            return;
        }
        for (i, entry) in self.panel.entries().iter().enumerate() {
            let mark = if entry.selected { "*" } else { " " };
            println!("{mark} {:>3}. {}", i + 1, entry.name);
        }
    }

    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Tables => self.print_tables(),
            Command::Toggle(targets) => {
                for target in targets {
                    match self.panel.toggle(&target) {
                        Ok(true) => println!("+ {target}"),
                        Ok(false) => println!("- {target}"),
                        Err(e) => println!("{e}"),
                    }
                }
            }
            Command::All => {
                self.panel.select_all();
                self.print_tables();
            }
            Command::None => self.panel.select_none(),
            Command::Schema => match &self.schema {
                Some(schema) => println!("{schema}"),
                None => println!("No schema loaded. Use .reload to fetch it."),
            },
            Command::Reload => self.reload().await,
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
            Command::Question(question) => {
                println!("Generating...");
                match self.api.submit(&question, &self.panel).await {
                    SubmitOutcome::Warning(warning) => println!("{warning}"),
                    SubmitOutcome::Failed(e) => println!("{e}"),
                    SubmitOutcome::Answered(answer) => println!("{}\n", render_answer(&answer)),
                }
            }
        }
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _ = dotenvy::dotenv();
    let loaded = match args.config.as_deref() {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("WARNING: Invalid configuration ({e}), using defaults");
        Config::default()
    });
    init_tracing(&config.logging);

    if let Some(server) = args.server {
        config.client.server = server;
    }
    if let Some(timeout) = args.timeout_secs {
        config.client.timeout_secs = timeout;
    }

    let api = ApiClient::new(
        &config.client.server,
        Duration::from_secs(config.client.timeout_secs),
    );

    println!("Text2SQL client v{}", env!("CARGO_PKG_VERSION"));
    println!("Connecting to server at {}...", api.base_url());
    match api.health().await {
        Ok(health) => println!("Connected (server v{}).", health.version),
        Err(e) => println!("{e}"),
    }

    let mut state = ReplState {
        api,
        schema: None,
        panel: SchemaPanel::default(),
    };
    state.reload().await;
    println!("Type .help for commands.");
    println!();

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline(&state.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match Command::parse(line) {
                    Ok(command) => {
                        if !state.handle(command).await {
                            break;
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Use .quit to exit");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
