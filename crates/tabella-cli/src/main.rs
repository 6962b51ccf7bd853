mod commands;
mod launch;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use commands::InputArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tabella",
    version,
    about = "Extract line items from supplier invoice PDFs into a spreadsheet"
)]
struct Cli {
    /// Log file, truncated on every run
    #[arg(long, global = true, value_name = "FILE", default_value = "app.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify the supplier, extract its table and write the spreadsheet
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// Spreadsheet to write
        #[arg(short = 'O', long, value_name = "FILE", default_value = "output.xlsx")]
        output: PathBuf,

        /// Supplier registry JSON (default: built-in registry)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,

        /// Do not open the spreadsheet when done
        #[arg(long)]
        no_open: bool,
    },
    /// Only run the supplier probes and report what they found
    Identify {
        #[command(flatten)]
        input: InputArgs,

        /// Supplier registry JSON (default: built-in registry)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,
    },
    /// Print the extracted table without writing a spreadsheet
    Preview {
        #[command(flatten)]
        input: InputArgs,

        /// Supplier registry JSON (default: built-in registry)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect supplier registries
    Suppliers {
        #[command(subcommand)]
        action: SuppliersAction,
    },
}

#[derive(Subcommand)]
enum SuppliersAction {
    /// List probe positions and supplier templates
    List {
        /// Supplier registry JSON (default: built-in registry)
        #[arg(long, value_name = "FILE")]
        registry: Option<PathBuf>,
    },
    /// Validate a registry file
    Validate {
        /// Path to JSON registry file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_file);

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            registry,
            no_open,
        } => commands::extract::run(&input, &output, registry.as_deref(), no_open),
        Commands::Identify { input, registry } => {
            commands::identify::run(&input, registry.as_deref())
        }
        Commands::Preview {
            input,
            registry,
            output,
        } => commands::preview::run(&input, registry.as_deref(), &output),
        Commands::Suppliers { action } => match action {
            SuppliersAction::List { registry } => commands::suppliers::list(registry.as_deref()),
            SuppliersAction::Validate { file } => commands::suppliers::validate(&file),
        },
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
