//! Vibes CLI - turn CSV order exports into invoice spreadsheets and PDFs
//!
//! ```bash
//! vibes serve                        # Start HTTP server (port 5000)
//! vibes generate orders.csv          # Write .xlsx, .html and .pdf to ./outputs
//! vibes preview orders.csv           # Print the transformed rows as JSON
//! vibes render Vibes_Invoice_X.xlsx  # Re-render an existing spreadsheet
//! ```

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use vibes::{
    preview_bytes, render_document, Config, FixedClock, InvoicePipeline, WkHtmlToPdf,
};

#[derive(Parser)]
#[command(name = "vibes")]
#[command(about = "Turn CSV order exports into styled invoice spreadsheets and PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Directory and engine overrides (defaults come from VIBES_* / .env)
#[derive(Args, Debug, Clone, Default)]
struct PathArgs {
    /// Directory for uploaded CSV files
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Directory for generated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to the wkhtmltopdf binary
    #[arg(long)]
    wkhtmltopdf: Option<PathBuf>,
}

impl PathArgs {
    fn into_config(self) -> Config {
        let mut config = Config::from_env();
        if let Some(dir) = self.upload_dir {
            config = config.with_upload_dir(dir);
        }
        if let Some(dir) = self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(bin) = self.wkhtmltopdf {
            config = config.with_wkhtmltopdf(bin);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        #[command(flatten)]
        paths: PathArgs,
    },

    /// Full pipeline: CSV → XLSX → HTML → PDF
    Generate {
        /// Input CSV file
        input: PathBuf,

        /// Run date used for the title and file names (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        paths: PathArgs,
    },

    /// Print the sorted, numbered rows as JSON without writing files
    Preview {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an existing spreadsheet to HTML and PDF beside it
    Render {
        /// Input .xlsx file
        input: PathBuf,

        /// Path to the wkhtmltopdf binary
        #[arg(long)]
        wkhtmltopdf: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, paths } => cmd_serve(port, paths).await,

        Commands::Generate { input, date, paths } => cmd_generate(&input, date, paths),

        Commands::Preview {
            input,
            delimiter,
            output,
        } => cmd_preview(&input, delimiter, output.as_deref()),

        Commands::Render { input, wkhtmltopdf } => cmd_render(&input, wkhtmltopdf),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: u16, paths: PathArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = InvoicePipeline::new(paths.into_config());
    vibes::server::start_server(port, pipeline).await
}

fn cmd_generate(
    input: &Path,
    date: Option<NaiveDate>,
    paths: PathArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = InvoicePipeline::new(paths.into_config());
    if let Some(date) = date {
        pipeline = pipeline.with_clock(FixedClock(date));
    }

    let output = pipeline.run(input)?;

    eprintln!("\n✨ Done! {} rows", output.rows.len());
    eprintln!("   📊 {}", output.spreadsheet.display());
    eprintln!("   🌐 {}", output.markup.display());
    eprintln!("   📄 {}", output.document.display());
    Ok(())
}

fn cmd_preview(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Previewing: {}", input.display());

    let bytes = fs::read(input)?;
    let table = preview_bytes(&bytes, delimiter)?;
    eprintln!("✅ {} invoice rows", table.len());

    let json = serde_json::to_string_pretty(&table.rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_render(input: &Path, wkhtmltopdf: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🖨️  Rendering: {}", input.display());

    let binary = wkhtmltopdf.unwrap_or_else(|| Config::from_env().wkhtmltopdf);
    let engine = WkHtmlToPdf::new(binary);
    let files = render_document(input, &engine)?;

    eprintln!("   🌐 {}", files.markup.display());
    eprintln!("   📄 {}", files.document.display());
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
