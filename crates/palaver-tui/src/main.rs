mod app;
mod cli;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use clap::Parser;
use colored::*;
use palaver_core::{build_provider, list_models, Config, ExchangeController, ExchangeOutcome};

use app::App;
use cli::{Cli, Commands};
use tui::EventHandler;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            logging::init_file(cli.log_file.clone());
        }
        Some(_) => logging::init_stderr(),
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not load config, using defaults");
        Config::new()
    });
    cli.apply(&mut config);

    if cli.save {
        if let Some(model) = &cli.model {
            Config::save_default_model(model)?;
        }
    }

    match cli.command {
        None => run_widget(&config).await,
        Some(Commands::Ask { question }) => ask(&config, &question).await,
        Some(Commands::Models) => print_models(&config).await,
    }
}

async fn run_widget(config: &Config) -> Result<()> {
    let provider = build_provider(config)?;
    let controller = ExchangeController::new(provider, config.model());
    let mut app = App::new(config.provider(), controller);

    tracing::info!(
        provider = config.provider().as_str(),
        model = %config.model(),
        key_source = config.key_source().unwrap_or("none"),
        "opening chat widget"
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(config: &Config, question: &str) -> Result<()> {
    let provider = build_provider(config)?;
    let model = config.model();
    let mut controller = ExchangeController::new(provider, model.clone());

    println!("🤖 Asking {} ({})...\n", model.bold().magenta(), config.provider().display_name());

    match controller.exchange(question).await {
        None => println!("{}", "Nothing to ask: the question is empty".yellow()),
        Some(outcome) => {
            if let Some(reply) = controller.transcript().last() {
                let label = match outcome {
                    ExchangeOutcome::Fulfilled => "Response:".bold().green(),
                    ExchangeOutcome::Failed => "Error:".bold().red(),
                };
                println!("{}", label);
                println!("{}", reply.content());
            }
        }
    }

    Ok(())
}

async fn print_models(config: &Config) -> Result<()> {
    let provider = config.provider();

    println!("\n{}", format!("🤖 Available {} Models", provider.display_name()).bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    match list_models(config).await {
        Ok(models) if models.is_empty() => {
            println!("{}", "No models found. Pull a model with: ollama pull llama3.2".yellow());
        }
        Ok(models) => {
            let current = config.model();
            for model in models {
                if model == current {
                    println!("  • {} {}", model.green(), "(default)".dimmed());
                } else {
                    println!("  • {}", model.green());
                }
            }
        }
        Err(e) => {
            println!("{}: {}", "Error listing models".red(), e);
            println!("Make sure Ollama is running: {}", "ollama serve".bold());
        }
    }

    Ok(())
}
