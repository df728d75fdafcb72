//! List command - show packages in the package directory

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::UniloadResult;
use crate::package::{list_available_packages, AvailablePackage, PackageSource};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> UniloadResult<()> {
    let dir = args.dir.unwrap_or_else(|| config.loader.package_dir());
    let packages = list_available_packages(&dir).await?;

    if packages.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                println!("No packages found in {}", dir.display());
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&packages),
        OutputFormat::Json => print_json(&packages)?,
        OutputFormat::Plain => print_plain(&packages),
    }

    Ok(())
}

fn print_table(packages: &[AvailablePackage]) {
    println!(
        "{:<20} {:<10} {:<8} {:<20} {}",
        style("NAME").bold(),
        style("VERSION").bold(),
        style("SOURCE").bold(),
        style("SLICES").bold(),
        style("DESCRIPTION").bold()
    );
    println!("{}", "-".repeat(80));

    for package in packages {
        let source = match package.source {
            PackageSource::Built => style("built").green(),
            PackageSource::Local => style("local").yellow(),
        };

        println!(
            "{:<20} {:<10} {:<8} {:<20} {}",
            package.name,
            package.version,
            source,
            package.slices.join(","),
            style(&package.description).dim()
        );
    }

    println!();
    println!("{} package(s)", packages.len());
}

fn print_json(packages: &[AvailablePackage]) -> UniloadResult<()> {
    let json = serde_json::to_string_pretty(packages)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(packages: &[AvailablePackage]) {
    for package in packages {
        println!("{}", package.name);
    }
}
