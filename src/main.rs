use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{Attribute, Cell, Table};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use invoice_generator::settings::{self, Settings, SettingsSource};
use invoice_generator::{terminal, web};

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-generator", version, about = "Generate fixed-layout PDF invoices")]
struct Cli {
    /// Settings file to use instead of the user settings
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the invoices are written to
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new invoice in the terminal
    New {
        /// Supplier number from the list
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        project_number: Option<String>,
        #[arg(long)]
        project_address: Option<String>,
        /// Total contract value in dollars
        #[arg(long)]
        contract_value: Option<String>,
    },
    /// Run the web form
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Show the active settings
    Config {
        /// Write the default settings file if none exists
        #[arg(long)]
        init: bool,
    },
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Config { init: true } = command {
        let path = settings::init_user_settings().context("Failed to write settings file")?;
        println!("✅ Settings file: {}", path.display());
    }

    let (mut settings, source) =
        Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }
    debug!(%source, output_dir = %settings.output_dir.display(), "settings ready");

    match command {
        Commands::New {
            supplier,
            project_number,
            project_address,
            contract_value,
        } => {
            let presets = terminal::Presets {
                supplier,
                project_number,
                project_address,
                contract_value,
            };
            terminal::run(&settings, &presets)
        }
        Commands::Serve { bind, port } => actix_web::rt::System::new()
            .block_on(web::serve(settings, &bind, port))
            .context("Web server stopped"),
        Commands::Config { .. } => {
            show_settings(&settings, &source);
            Ok(())
        }
    }
}

// ==========================================
// Settings Display
// ==========================================

fn show_settings(settings: &Settings, source: &SettingsSource) {
    println!("--- Settings ({source}) ---");
    if let Some(path) = settings::user_settings_path() {
        println!("User settings path: {}", path.display());
    }
    println!("Output directory: {}", settings.output_dir.display());
    println!("Logo: {}", settings.logo_path.display());

    let mut company = Table::new();
    company.set_header(vec![Cell::new("Company").add_attribute(Attribute::Bold), Cell::new("")]);
    let company_lines = settings.company.header_lines();
    if let Some((name, rest)) = company_lines.split_first() {
        company.add_row(vec![Cell::new("Name"), Cell::new(name)]);
        for line in rest {
            company.add_row(vec![Cell::new(""), Cell::new(line)]);
        }
    }
    for field in settings.bank.iter() {
        company.add_row(vec![Cell::new(&field.label), Cell::new(&field.value)]);
    }
    println!("{company}");

    println!("{}", terminal::supplier_table(&settings.suppliers));
}
