use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Recommender;
use crate::renderer::cards::render_recommendation;

/// Run one query through the pipeline and print the reply with product cards.
/// Blank queries are rejected by the caller before credentials are resolved.
pub fn cmd_ask(config: &Config, query: &str, show_all: bool, json: bool) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let recommender = Recommender::from_config(config);
    let recommendation = rt.block_on(recommender.search(query))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    println!("{}", "Assistant:".cyan().bold());
    print!("{}", render_recommendation(&recommendation, show_all));

    Ok(())
}
