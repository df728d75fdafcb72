//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::UniloadResult;
use console::style;

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> UniloadResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => println!("{}", toml::to_string_pretty(config)?),
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => {
            if manager.init(force).await? {
                println!(
                    "{} Configuration initialized at {}",
                    style("✓").green(),
                    manager.path().display()
                );
            } else {
                println!(
                    "{} Config already exists at {}",
                    style("!").yellow(),
                    manager.path().display()
                );
                println!("  Use --force to overwrite");
            }
        }
        Some(ConfigAction::Set { key, value }) => {
            manager.set(config, &key, &value).await?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
    }

    Ok(())
}
