//! List installed LV2 plugins.
//!
//! Bundles are found on `LV2_PATH`, or the default system directories when
//! it is unset.

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lv2meta_registry::{Lv2Registry, PluginInfo, RegistryConfig};

#[derive(Parser)]
#[command(name = "lv2meta_list")]
#[command(author, version, about = "Inspect installed LV2 plugin metadata")]
struct Cli {
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Plugin URIs, sorted (the default).
    Plugins,
    /// The plugin category tree, root first.
    Categories,
    /// Full record of one plugin.
    Plugin {
        /// Plugin URI
        uri: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut registry = Lv2Registry::load(RegistryConfig::from_env());

    match cli.command.unwrap_or(Commands::Plugins) {
        Commands::Categories => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(registry.categories())?);
            } else {
                for category in registry.categories() {
                    let labels: Vec<&str> = category
                        .path
                        .iter()
                        .map(|l| l.as_deref().unwrap_or("?"))
                        .collect();
                    println!("{}\t{}", labels.join(" / "), category.class);
                }
            }
        }
        Commands::Plugins => {
            if cli.json {
                let uris: Vec<&str> = registry.plugin_uris().collect();
                println!("{}", serde_json::to_string_pretty(&uris)?);
            } else {
                for uri in registry.plugin_uris() {
                    println!("{uri}");
                }
            }
        }
        Commands::Plugin { uri } => {
            let info = registry
                .plugin_info(&uri)
                .with_context(|| format!("loading plugin {uri}"))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print_plugin(&info);
            }
        }
    }
    Ok(())
}

fn print_plugin(info: &PluginInfo) {
    println!("{} <{}>", info.name, info.uri);
    if let Some(license) = &info.license {
        println!("  license: {license}");
    }
    for maintainer in &info.maintainers {
        println!("  maintainer: {}", maintainer.name);
    }
    for port in &info.ports {
        let direction = match (port.kinds.input, port.kinds.output) {
            (true, false) => "in",
            (false, true) => "out",
            _ => "?",
        };
        let kind = if port.kinds.audio {
            "audio"
        } else if port.kinds.control {
            "control"
        } else if port.kinds.event {
            "event"
        } else {
            "other"
        };
        println!(
            "  [{}] {} ({}) {kind} {direction}",
            port.index, port.symbol, port.name
        );
    }
}
