use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use kbchat_core::config::{ChatMode, Config};

const BANNER: &str = r"
    -------------------------------------------------

    ██╗  ██╗██████╗  ██████╗██╗  ██╗ █████╗ ████████╗
    ██║ ██╔╝██╔══██╗██╔════╝██║  ██║██╔══██╗╚══██╔══╝
    █████╔╝ ██████╔╝██║     ███████║███████║   ██║
    ██╔═██╗ ██╔══██╗██║     ██╔══██║██╔══██║   ██║
    ██║  ██╗██████╔╝╚██████╗██║  ██║██║  ██║   ██║
    ╚═╝  ╚═╝╚═════╝  ╚═════╝╚═╝  ╚═╝╚═╝  ╚═╝   ╚═╝

    -------------------------------------------------
";

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_endpoint(default: &str) -> Result<String> {
    let endpoint: String = Input::new()
        .with_prompt("Backend address")
        .default(default.to_string())
        .interact_text()
        .context("Failed to read backend address")?;

    if endpoint.trim().is_empty() {
        return Err(anyhow::anyhow!("Backend address cannot be empty"));
    }

    Ok(endpoint.trim().to_string())
}

fn setup_mode() -> Result<ChatMode> {
    let modes = [
        ("model", ChatMode::Model),
        ("knowledge base", ChatMode::KnowledgeBase),
        ("search engine", ChatMode::SearchEngine),
    ];
    let labels: Vec<&str> = modes.iter().map(|(label, _)| *label).collect();

    let selection = Select::new()
        .with_prompt("Select your chat mode")
        .items(&labels)
        .default(0)
        .interact()
        .context("Failed to select chat mode")?;

    Ok(modes[selection].1)
}

fn setup_model(default: &str) -> Result<String> {
    let model: String = Input::new()
        .with_prompt("Model name")
        .default(default.to_string())
        .interact_text()
        .context("Failed to read model name")?;

    Ok(model)
}

fn setup_knowledge_base(default: &str) -> Result<String> {
    let kb_name: String = Input::new()
        .with_prompt("Knowledge base name")
        .default(default.to_string())
        .interact_text()
        .context("Failed to read knowledge base name")?;

    Ok(kb_name)
}

fn setup_search_engine() -> Result<String> {
    let engines = ["duckduckgo", "bing", "metaphor"];

    let selection = Select::new()
        .with_prompt("Select your search engine")
        .items(&engines)
        .default(0)
        .interact()
        .context("Failed to select search engine")?;

    Ok(engines[selection].to_string())
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to kbchat!").white().bold());
    println!(
        "  {}",
        style("This wizard will configure your chat client in under 30 seconds.").dim()
    );
    println!();

    // Re-running the wizard keeps previous answers as defaults.
    let mut config = Config::load_or_init().unwrap_or_default();

    print_step(1, 3, "Backend Address");
    config.endpoint = setup_endpoint(&config.endpoint)?;

    print_step(2, 3, "Chat Mode");
    config.mode = setup_mode()?;

    print_step(3, 3, "Mode Parameters");
    match config.mode {
        ChatMode::Model => {
            config.llm.model = setup_model(&config.llm.model)?;
        }
        ChatMode::KnowledgeBase => {
            config.knowledge_base.kb_name = setup_knowledge_base(&config.knowledge_base.kb_name)?;
            config.knowledge_base.model = setup_model(&config.knowledge_base.model)?;
        }
        ChatMode::SearchEngine => {
            config.search_engine.engine = setup_search_engine()?;
            config.search_engine.model = setup_model(&config.search_engine.model)?;
        }
    }

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(kbchat_core::config::get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("kbchat chat").cyan().bold()
    );
    println!();

    Ok(config)
}
