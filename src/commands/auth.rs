use std::time::Instant;

use colored::Colorize;

use crate::auth::providers::{Provider, Service};
use crate::auth::{self, AuthStore, ServiceCredential};
use crate::config::Config;
use crate::embeddings::{Embedder, EmbeddingProvider};
use crate::error::{Result, ShopError};
use crate::index::PineconeIndex;
use crate::llm::{ChatModel, CompletionRequest, LlmClient};

pub fn cmd_auth_login(service_name: Option<String>, set_default: bool) -> Result<()> {
    use dialoguer::{Input, Password, Select};

    let service = if let Some(name) = service_name {
        Service::from_str_loose(&name).ok_or_else(|| {
            ShopError::Auth(format!(
                "Unknown service: {}. Use: openai, anthropic, pinecone",
                name
            ))
        })?
    } else {
        let items: Vec<&str> = Service::all().iter().map(|s| s.display_name()).collect();
        let selection = Select::new()
            .with_prompt("Select service")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| ShopError::Auth(format!("Selection cancelled: {}", e)))?;
        Service::all()[selection]
    };

    let key = Password::new()
        .with_prompt(format!("Enter {} API key", service.display_name()))
        .interact()
        .map_err(|e| ShopError::Auth(format!("Input cancelled: {}", e)))?;

    if key.trim().is_empty() {
        return Err(ShopError::Auth("API key cannot be empty".into()));
    }

    let mut credential = ServiceCredential::api_key(key.trim().to_string());

    if service == Service::Pinecone {
        let index: String = Input::new()
            .with_prompt("Pinecone index name")
            .interact_text()
            .map_err(|e| ShopError::Auth(format!("Input cancelled: {}", e)))?;
        if index.trim().is_empty() {
            return Err(ShopError::Auth("Index name cannot be empty".into()));
        }
        let host: String = Input::new()
            .with_prompt("Index host (leave empty to look it up)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ShopError::Auth(format!("Input cancelled: {}", e)))?;

        credential.index = Some(index.trim().to_string());
        credential.host = Some(host.trim().to_string()).filter(|h| !h.is_empty());
    }

    let mut store = AuthStore::load()?;
    store.set(service, credential);

    // Only chat providers can be the default
    let is_chat_provider = Provider::from_str_loose(&service.to_string()).is_some();
    if is_chat_provider && (set_default || store.default_provider.is_none()) {
        store.default_provider = Some(service.to_string());
    }

    store.save()?;

    println!(
        "{} Stored credentials for {}.",
        "Done!".green().bold(),
        service.display_name()
    );
    if store.default_provider.as_deref() == Some(&service.to_string()) {
        println!("  Set as default chat provider.");
    }

    Ok(())
}

pub fn cmd_auth_list() -> Result<()> {
    let store = AuthStore::load()?;

    println!("{}", "Configured Services".green().bold());
    println!("{}", "=".repeat(50));

    for &service in Service::all() {
        let status = if auth::process_env(service.env_var_name()).is_some() {
            "env var".green().to_string()
        } else if store.get(service).is_some() {
            "auth.json".cyan().to_string()
        } else {
            "not configured".dimmed().to_string()
        };

        let default_marker = if store.default_provider.as_deref() == Some(&service.to_string()) {
            " (default)"
        } else {
            ""
        };

        println!(
            "  {}{}\t{}",
            service.display_name().cyan().bold(),
            default_marker,
            status
        );
    }

    Ok(())
}

pub fn cmd_auth_logout(service_name: &str) -> Result<()> {
    let service = Service::from_str_loose(service_name).ok_or_else(|| {
        ShopError::Auth(format!(
            "Unknown service: {}. Use: openai, anthropic, pinecone",
            service_name
        ))
    })?;

    let mut store = AuthStore::load()?;
    store.remove(service);
    store.save()?;

    println!(
        "{} Removed credentials for {}.",
        "Done!".green().bold(),
        service.display_name()
    );

    Ok(())
}

pub fn cmd_auth_status() -> Result<()> {
    match Config::load(None) {
        Ok(config) => {
            println!("{}", "Active Configuration".green().bold());
            println!("{}", "=".repeat(40));
            println!(
                "  Chat:       {} ({})",
                config.llm.provider.display_name().cyan(),
                config.llm.model
            );
            println!("  Endpoint:   {}", config.llm.endpoint);
            if let Some(ref key) = config.llm.api_key {
                println!("  Chat key:   {}", mask(key));
            }
            println!(
                "  Embeddings: {} ({})",
                config.embedding.backend.to_string().cyan(),
                config.embedding.model
            );
            println!("  Index:      {}", config.index.index_name.cyan());
            println!(
                "  Index host: {}",
                config
                    .index
                    .host
                    .as_deref()
                    .unwrap_or("(resolved on first query)")
            );
            println!("  Index key:  {}", mask(&config.index.api_key));
        }
        Err(ShopError::MissingCredential(msg)) => {
            println!("{} {}", "Note:".yellow(), msg);
            println!("  Run 'shopwhisper auth login' to configure a service.");
        }
        Err(e) => {
            println!("{} Failed to resolve configuration: {}", "Error:".red(), e);
        }
    }

    Ok(())
}

/// One embedding call, one index lookup and one minimal chat completion,
/// each with latency. Fails if any check fails.
pub fn cmd_auth_test(config: &Config) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcomes = rt.block_on(async {
        let mut outcomes = Vec::with_capacity(CHECK_COUNT);

        let embedder = EmbeddingProvider::new(&config.embedding);
        let start = Instant::now();
        outcomes.push(report(
            "embeddings",
            start,
            embedder.embed("connection test").await.map(|vector| {
                format!("model={}  dimension={}", embedder.model(), vector.len())
            }),
        ));

        let index = PineconeIndex::new(&config.index);
        let start = Instant::now();
        outcomes.push(report(
            "index",
            start,
            index.describe_index().await.map(|desc| {
                format!(
                    "name={}  dimension={}  metric={}",
                    desc.name,
                    desc.dimension
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "?".into()),
                    desc.metric.as_deref().unwrap_or("?")
                )
            }),
        ));

        let chat = LlmClient::new(&config.llm);
        let request = CompletionRequest {
            system: "Reply with one word.".to_string(),
            user: "hi".to_string(),
            max_tokens: 10,
        };
        let start = Instant::now();
        outcomes.push(report(
            "chat",
            start,
            chat.complete(&request).await.map(|reply| {
                let snippet: String = reply.trim().chars().take(40).collect();
                format!("model={}  reply={:?}", chat.model(), snippet)
            }),
        ));

        outcomes
    });

    let failed = outcomes.iter().filter(|ok| !**ok).count();
    if failed > 0 {
        return Err(ShopError::ChecksFailed {
            failed,
            total: outcomes.len(),
        });
    }

    println!("{} All services reachable.", "Done!".green().bold());
    Ok(())
}

const CHECK_COUNT: usize = 3;

/// Print one check line and return whether it passed.
fn report(label: &str, start: Instant, outcome: Result<String>) -> bool {
    let elapsed = start.elapsed().as_millis();
    match outcome {
        Ok(detail) => {
            println!("{} {:<11} {}ms  {}", "OK".green().bold(), label, elapsed, detail);
            true
        }
        Err(e) => {
            println!("{} {:<11} {}ms  {}", "FAIL".red().bold(), label, elapsed, e);
            false
        }
    }
}

fn mask(key: &str) -> String {
    if key.chars().count() > 8 {
        let head: String = key.chars().take(4).collect();
        let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}
