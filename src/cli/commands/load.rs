//! Load command - load packages and print their exports

use crate::cli::args::{LoadArgs, LoadFormat};
use crate::config::{Config, LoadOverrides, LoadSettings};
use crate::error::UniloadResult;
use crate::loader::{CacheRegistry, LoadOptions, LoadResult};

/// Execute the load command
pub async fn execute(args: LoadArgs, config: &Config) -> UniloadResult<()> {
    let settings = LoadSettings::resolve(
        &config.loader,
        LoadOverrides {
            dir: args.dir,
            release: args.release,
            checkout: args.checkout,
        },
    );

    let loader = settings.into_loader(CacheRegistry::shared());
    let result = loader.load(&LoadOptions::new(args.packages))?;

    match args.format {
        LoadFormat::Json => print_json(&result)?,
        LoadFormat::Plain => print_plain(&result),
    }

    Ok(())
}

fn print_json(result: &LoadResult) -> UniloadResult<()> {
    let json = serde_json::to_string_pretty(&result.to_json())?;
    println!("{}", json);
    Ok(())
}

fn print_plain(result: &LoadResult) {
    for (name, exports) in result.iter() {
        let keys: Vec<&str> = exports
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        println!("{}: {}", name, keys.join(", "));
    }
}
