use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use replyguy::persona::{load_personas, select_persona};
use replyguy::{handle_chat_message, Config, ReplyEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate in-character replies with an LLM.
#[derive(Parser, Debug)]
#[command(name = "replyguy", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Characters file, overriding `characters_path` from config
    #[arg(long, global = true)]
    characters: Option<PathBuf>,

    /// Agent name or handle to speak as (defaults to the first character)
    #[arg(long, short = 'c', global = true)]
    character: Option<String>,

    /// Also print the rendered prompt
    #[arg(long, global = true)]
    show_prompt: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reply to a post (policy and length checked unless --chat)
    Reply {
        message: String,
        /// Use chat mode: single shot, no retries
        #[arg(long)]
        chat: bool,
        /// Recent conversation, newline separated
        #[arg(long)]
        history: Option<String>,
    },
    /// Chat reply that falls back to an apology on any error
    Chat {
        message: String,
        #[arg(long)]
        history: Option<String>,
    },
    /// Post about a random configured topic
    Topic {
        #[arg(long)]
        history: Option<String>,
    },
    /// Rewrite a prompt for image generation
    ImagePrompt { prompt: String },
    /// List loaded characters
    Characters,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let characters_path = match &cli.characters {
        Some(path) => path.clone(),
        None => config.characters_path()?,
    };
    let personas = load_personas(&characters_path)?;

    if let Command::Characters = cli.command {
        for persona in &personas {
            println!("{} (@{}) model={}", persona.agent_name, persona.username, persona.model);
        }
        return Ok(());
    }

    let persona = select_persona(&personas, cli.character.as_deref())
        .with_context(|| format!("no character named {:?}", cli.character.as_deref().unwrap_or_default()))?;
    tracing::info!(character = %persona.agent_name, "Loaded character");

    let engine = ReplyEngine::from_config(&config)?;

    match cli.command {
        Command::Reply { message, chat, history } => {
            let generated = engine
                .generate_reply(&message, persona, chat, history.as_deref())
                .await?;
            if cli.show_prompt {
                println!("{}\n---", generated.prompt);
            }
            println!("{}", generated.reply);
        }
        Command::Chat { message, history } => {
            let reply = handle_chat_message(&engine, &message, persona, true, history.as_deref()).await;
            println!("{reply}");
        }
        Command::Topic { history } => {
            let generated = engine.generate_topic_post(persona, history.as_deref()).await?;
            if cli.show_prompt {
                println!("{}\n---", generated.prompt);
            }
            println!("{}", generated.reply);
        }
        Command::ImagePrompt { prompt } => {
            println!("{}", engine.generate_image_prompt(&prompt, persona).await?);
        }
        Command::Characters => {}
    }

    engine.observer().flush();
    Ok(())
}
