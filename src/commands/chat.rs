use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Recommender;
use crate::tui;

/// Open the interactive chat widget.
pub fn cmd_chat(config: &Config) -> Result<()> {
    tui::run_tui(Recommender::from_config(config))
}
