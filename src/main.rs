use anyhow::{Context, Result};
use clap::Parser;
use glyphfetch::config::Config;
use glyphfetch::facts::{HostFacts, VOCABULARY};
use glyphfetch::{Registry, ascii, display};
use log::LevelFilter;
use std::path::PathBuf;

/// Prints system information next to a logo.
#[derive(Parser, Debug)]
#[command(name = "glyphfetch", version)]
struct Cli {
    /// Config file to read instead of the default location
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Logo source: "os", "off" or a file path
    #[arg(short, long)]
    source_path: Option<String>,

    /// Do not print a logo
    #[arg(short, long)]
    no_logo: bool,

    /// Columns between the logo and the info
    #[arg(short, long)]
    offset: Option<usize>,

    /// Emit markup spans instead of terminal escapes
    #[arg(short, long)]
    markup: bool,

    /// List modules and their members, then exit
    #[arg(short, long)]
    list_modules: bool,

    /// Print every included module as JSON instead of rendering
    #[arg(short, long)]
    dump: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source_path {
            config.source_path = source.clone();
        }
        if self.no_logo {
            config.source_path = "off".to_string();
        }
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if self.markup {
            config.gui = true;
        }
    }
}

fn list_modules() {
    for (module, members) in VOCABULARY {
        println!("{module}");
        for member in *members {
            println!("  {member}");
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => {
            let path = Config::default_path();
            Config::load_or_create(&path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
    };
    cli.apply(&mut config);
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(LevelFilter::Warn))
        .parse_default_env()
        .init();

    if cli.list_modules {
        list_modules();
        return Ok(());
    }

    let config = load_config(&cli)?;
    let mut registry = Registry::new(HostFacts::new());

    if cli.dump {
        for include in &config.includes {
            registry.include(include)?;
        }
        let json = serde_json::to_string_pretty(&registry.tables())
            .context("failed to serialize module tables")?;
        println!("{json}");
        return Ok(());
    }

    let logo = ascii::load_logo(&config.logo_source(), &mut registry).context("failed to load logo")?;
    let lines = display::render(&config, &mut registry, logo.as_deref())?;
    display::print(&lines).context("failed to write output")?;
    Ok(())
}
