use anyhow::Result;
use clap::{Parser, Subcommand};
use kbchat_core::{backends, config, session};
mod onboard;
use std::io::Write;

#[derive(Parser)]
#[command(name = "kbchat")]
#[command(about = "kbchat - Talk to a knowledge-base chat backend from your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configuration wizard
    Onboard,
    /// Send one message, or start an interactive chat
    Chat {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List the knowledge bases available on the backend
    KbList,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat { message: None }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::KbList => {
            let config = config::load_config()?;
            let backend = backends::create_backend(&config)?;
            let session = session::ChatSession::new(backend, config.history);

            let names = session.list_knowledge_bases().await?;
            if names.is_empty() {
                println!("No knowledge bases found on {}", config.endpoint);
            } else {
                println!("Knowledge bases on {}:", config.endpoint);
                for name in names {
                    println!("  - {}", name);
                }
            }
        }
        Commands::Chat { message } => {
            let config = config::load_config()?;
            let backend = backends::create_backend(&config)?;
            let mut session = session::ChatSession::new(backend, config.history);

            if let Some(msg) = message {
                match session.send(&msg).await {
                    Ok(reply) => {
                        println!("{}", reply);
                    }
                    Err(e) => {
                        eprintln!("❌ Error: {}", e);
                        anyhow::bail!("Chat request failed: {}", e);
                    }
                }
            } else {
                println!("💬 kbchat ({} mode via {})", config.mode, config.endpoint);
                println!("Type your message (Ctrl+D to exit):\n");
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                let stdout = io::stdout();
                let mut stdout_lock = stdout.lock();

                loop {
                    print!("> ");
                    let _ = stdout_lock.flush();

                    let mut input = String::new();
                    let mut reader = stdin.lock();

                    match reader.read_line(&mut input) {
                        Ok(0) => {
                            println!("\n👋 Goodbye!");
                            break;
                        }
                        Ok(_) => {
                            let input = input.trim();
                            if input.is_empty() {
                                continue;
                            }

                            match session.send(input).await {
                                Ok(reply) => {
                                    println!("\n{}", reply);
                                }
                                Err(e) => {
                                    eprintln!("❌ Error: {}", e);
                                }
                            }

                            println!();
                        }
                        Err(_) => {
                            println!("\n👋 Goodbye!");
                            break;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
