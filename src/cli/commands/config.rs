use anyhow::{Context, Result};
use clap::Args;
use console::{style, Emoji};
use std::path::PathBuf;

use crate::config::{FixtureConfig, CONFIG_FILE_NAME};

/// Show the effective configuration or write a template
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write a commented default config file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

impl ConfigArgs {
    pub fn execute(self, config: &FixtureConfig, path: Option<&str>) -> Result<()> {
        let path = path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        if self.init {
            if path.exists() && !self.force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            std::fs::write(&path, FixtureConfig::default_config_string())
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!("{} Wrote {}", Emoji("📝", "[OK]"), style(path.display()).green());
            return Ok(());
        }

        let source = if path.exists() {
            path.display().to_string()
        } else {
            match FixtureConfig::user_config_path().filter(|p| p.exists()) {
                Some(user) => user.display().to_string(),
                None => "built-in defaults".to_string(),
            }
        };

        println!("# Config source: {}", style(source).dim());
        print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
        Ok(())
    }
}
