//! Command-line entry point for Mnemos chat agents.

mod cli;
mod repl;

use anyhow::{Context, bail};
use clap::Parser;
use cli::{Cli, Command, DEFAULT_COMPLETE_PROMPT, DEFAULT_STREAM_PROMPT, MemoriesCommand};
use log::{debug, info};
use mnemos::config::{LayeredConfigOptions, MnemosConfig};
use mnemos::core::{
    AgentSettings, LongTermContext, MemoryAgent, StatefulAgent, StatelessAgent, complete,
    stream_completion,
};
use mnemos::llm::{ChatProvider, OpenAiClient};
use mnemos::memory::{FileLongTermStore, LongTermStore, normalize_identity};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

/// Entry point for the Mnemos CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    mnemos::init_logging();

    let cli = Cli::parse();
    info!(
        "starting mnemos (config_set={}, model_set={})",
        cli.config.is_some(),
        cli.model.is_some()
    );
    let mut config = load_config(&cli)?;

    let mut stdout = io::stdout();
    let mut stdin = BufReader::new(tokio::io::stdin());
    match cli.command {
        Command::Complete { prompt } => {
            let llm = build_llm(&config)?;
            let settings = AgentSettings::from_config(&config);
            let prompt = prompt.as_deref().unwrap_or(DEFAULT_COMPLETE_PROMPT);
            let completion = complete(llm.as_ref(), &settings, prompt).await?;
            println!("{}", completion.content);
            println!("({:.2}s)", completion.elapsed.as_secs_f64());
        }
        Command::Stream { prompt } => {
            let llm = build_llm(&config)?;
            let settings = AgentSettings::from_config(&config);
            let prompt = prompt.as_deref().unwrap_or(DEFAULT_STREAM_PROMPT);
            let completion = stream_completion(llm.as_ref(), &settings, prompt, |delta| {
                print!("{delta}");
                let _ = io::stdout().flush();
            })
            .await?;
            println!();
            println!("({:.2}s)", completion.elapsed.as_secs_f64());
        }
        Command::Stateless => {
            let llm = build_llm(&config)?;
            let mut agent = StatelessAgent::new(llm, AgentSettings::from_config(&config));
            repl::run_session(&mut agent, &config.session, &mut stdin, &mut stdout).await?;
        }
        Command::Stateful => {
            let llm = build_llm(&config)?;
            let mut agent = StatefulAgent::new(llm, AgentSettings::from_config(&config));
            repl::run_session(&mut agent, &config.session, &mut stdin, &mut stdout).await?;
        }
        Command::Memory { window, style } => {
            cli::apply_memory_overrides(&mut config, window, style, None);
            config.validate().context("invalid memory options")?;
            let llm = build_llm(&config)?;
            let mut agent = MemoryAgent::new(llm, AgentSettings::from_config(&config));
            repl::run_session(&mut agent, &config.session, &mut stdin, &mut stdout).await?;
        }
        Command::LongTerm {
            window,
            memory_file,
            user,
        } => {
            cli::apply_memory_overrides(&mut config, window, None, memory_file.as_ref());
            config.validate().context("invalid memory options")?;
            let llm = build_llm(&config)?;
            let identity = match user {
                Some(user) => user,
                None => repl::prompt_identity(&mut stdin, &mut stdout).await?,
            };
            let settings = AgentSettings::from_config(&config);
            let store: Arc<dyn LongTermStore> = Arc::new(FileLongTermStore::new(
                config.memory.resolved_path(),
            ));
            let context = LongTermContext::load(llm.clone(), &settings, store, &identity)
                .await
                .context("failed to load long-term memory")?;
            print_loaded_memory(&mut stdout, &context)?;
            let mut agent = MemoryAgent::new(llm, settings).with_long_term(context);
            repl::run_session(&mut agent, &config.session, &mut stdin, &mut stdout).await?;
        }
        Command::Memories {
            memory_file,
            command,
        } => {
            cli::apply_memory_overrides(&mut config, None, None, memory_file.as_ref());
            let store = FileLongTermStore::new(config.memory.resolved_path());
            run_memories_command(&store, command, &mut stdout).await?;
        }
    }
    Ok(())
}

/// Load layered config and apply the global CLI overrides.
fn load_config(cli: &Cli) -> anyhow::Result<MnemosConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        info!("loading config from path: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered =
        MnemosConfig::load_layered_with_options(options).context("failed to load config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut config = layered.config;
    if let Some(model) = cli
        .model
        .clone()
        .or_else(|| std::env::var("MNEMOS_MODEL").ok())
    {
        config.model.name = model;
    }
    config.validate().context("invalid config")?;
    Ok(config)
}

/// Build the HTTP chat client from config and the provider's API key.
fn build_llm(config: &MnemosConfig) -> anyhow::Result<Arc<dyn ChatProvider>> {
    let key_env = config.model.resolved_api_key_env();
    let Some(api_key) = std::env::var(key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
    else {
        bail!("{key_env} is required to chat with {}", config.model.name);
    };
    info!(
        "building chat client (model={}, base_url={})",
        config.model.name,
        config.model.resolved_base_url()
    );
    let client = OpenAiClient::builder(api_key)
        .base_url(config.model.resolved_base_url())
        .timeout(Duration::from_secs(config.model.timeout_secs))
        .build()
        .context("failed to build chat client")?;
    Ok(Arc::new(client))
}

fn print_loaded_memory<W: Write>(out: &mut W, context: &LongTermContext) -> anyhow::Result<()> {
    let record = context.record();
    if record.is_empty() {
        writeln!(out, "No long-term memory yet for {}.", context.identity())?;
    } else {
        writeln!(
            out,
            "Loaded long-term memory for {}:\n{}",
            context.identity(),
            record.render()
        )?;
    }
    Ok(())
}

async fn run_memories_command<W: Write>(
    store: &dyn LongTermStore,
    command: MemoriesCommand,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        MemoriesCommand::Show { name } => {
            let key = normalize_identity(&name);
            let record = store.load(&key).await.context("failed to read memories")?;
            if record.is_empty() {
                writeln!(out, "No memories stored for {key}.")?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
            }
        }
        MemoriesCommand::Forget { name } => {
            let key = normalize_identity(&name);
            if store.remove(&key).await.context("failed to update memories")? {
                writeln!(out, "Forgot {key}.")?;
            } else {
                writeln!(out, "No memories stored for {key}.")?;
            }
        }
        MemoriesCommand::List => {
            let identities = store.identities().await.context("failed to read memories")?;
            if identities.is_empty() {
                writeln!(out, "No stored identities.")?;
            }
            for identity in identities {
                writeln!(out, "{identity}")?;
            }
        }
    }
    Ok(())
}
