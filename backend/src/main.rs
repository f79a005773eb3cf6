//! Hazardtool CLI - validate site CSVs and enrich them with hazard values
//!
//! # Main Commands
//!
//! ```bash
//! hazardtool process sites.csv           # Validate + enrich (mock values), write CSV
//! hazardtool process sites.csv --remote  # Same, against the hazard service
//! hazardtool serve                       # Start HTTP server (port 3000)
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! hazardtool validate sites.csv   # Parse + validate only
//! hazardtool template             # Write the input template CSV
//! hazardtool catalog              # Show allowed standards / risk levels / site classes
//! ```

use clap::{Parser, Subcommand};
use hazardtool::{
    check_input, encode_output, output_filename, template_csv, Enricher, HeaderMode, MockEnricher,
    Pipeline, PipelineError, QueryStyle, RemoteConfig, RemoteEnricher, RULE_CATALOG,
};
use std::fs;
use std::path::{Path, PathBuf};

use hazardtool::config::{DEFAULT_PORT, OUTPUT_PREFIX, TEMPLATE_FILENAME};
use hazardtool::parser::decode_bytes_auto;

#[derive(Parser)]
#[command(name = "hazardtool")]
#[command(about = "Validate site CSVs and enrich them with hazard values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → validate → enrich → CSV
    Process {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV file (default: generated name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header handling: auto, present or absent
        #[arg(long, default_value = "auto")]
        header: HeaderMode,

        /// Query the remote hazard service (needs HAZARD_API_KEY)
        #[arg(long)]
        remote: bool,

        /// Send only lat/lon to the remote service
        #[arg(long, requires = "remote")]
        legacy: bool,

        /// Seed for mock values
        #[arg(long, conflicts_with = "remote")]
        seed: Option<u64>,
    },

    /// Parse and validate a CSV without enriching
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// Header handling: auto, present or absent
        #[arg(long, default_value = "auto")]
        header: HeaderMode,
    },

    /// Write the input template CSV
    Template {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the validation rule catalog
    Catalog,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Query the remote hazard service (needs HAZARD_API_KEY)
        #[arg(long)]
        remote: bool,

        /// Send only lat/lon to the remote service
        #[arg(long, requires = "remote")]
        legacy: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            header,
            remote,
            legacy,
            seed,
        } => cmd_process(&input, output.as_deref(), header, remote, legacy, seed).await,

        Commands::Validate { input, header } => cmd_validate(&input, header),

        Commands::Template { output } => cmd_template(output.as_deref()),

        Commands::Catalog => cmd_catalog(),

        Commands::Serve { port, remote, legacy } => cmd_serve(port, remote, legacy).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn build_enricher(remote: bool, legacy: bool, seed: Option<u64>) -> Result<Enricher, Box<dyn std::error::Error>> {
    if remote {
        let style = if legacy { QueryStyle::Legacy } else { QueryStyle::Full };
        let config = RemoteConfig::from_env()?.with_query_style(style);
        eprintln!("   Hazard service: {}", config.endpoint);
        return Ok(RemoteEnricher::new(config)?.into());
    }

    Ok(match seed {
        Some(seed) => MockEnricher::seeded(seed),
        None => MockEnricher::new(),
    }
    .into())
}

async fn cmd_process(
    input: &Path,
    output: Option<&Path>,
    header: HeaderMode,
    remote: bool,
    legacy: bool,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let bytes = fs::read(input)?;
    let mut pipeline = Pipeline::new(build_enricher(remote, legacy, seed)?);

    let report = match pipeline.run_bytes(&bytes, header).await {
        Ok(report) => report,
        Err(PipelineError::Invalid { violations }) => {
            eprintln!("\n❌ {} violation(s), nothing was enriched:", violations.len());
            for v in &violations {
                eprintln!("   - {}", v);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let csv = encode_output(&report.rows)?;
    let path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(output_filename(OUTPUT_PREFIX, chrono::Utc::now())),
    };
    fs::write(&path, csv)?;

    eprintln!("\n✨ Enriched {} row(s) with {} values", report.rows.len(), report.enricher);
    eprintln!("💾 Output written to: {}", path.display());
    Ok(())
}

fn cmd_validate(input: &Path, header: HeaderMode) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let bytes = fs::read(input)?;
    let decoded = decode_bytes_auto(&bytes)?;

    match check_input(&decoded.text, header) {
        Ok(rows) => {
            eprintln!("✅ All {} row(s) valid", rows.len());
            Ok(())
        }
        Err(violations) => {
            eprintln!("\n❌ {} violation(s):", violations.len());
            for v in &violations {
                eprintln!("   - {}", v);
            }
            std::process::exit(1);
        }
    }
}

fn cmd_template(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let csv = template_csv()?;
    match output {
        Some(p) => {
            fs::write(p, &csv)?;
            eprintln!("💾 Template written to: {}", p.display());
        }
        None => {
            eprintln!("   (save as {})", TEMPLATE_FILENAME);
            print!("{}", csv);
        }
    }
    Ok(())
}

fn cmd_catalog() -> Result<(), Box<dyn std::error::Error>> {
    println!("Standards versions: {}", RULE_CATALOG.standards_versions().join(", "));
    println!("Risk levels:        {}", RULE_CATALOG.risk_levels().join(", "));
    println!("\nSite classes:");
    for version in RULE_CATALOG.standards_versions() {
        let classes = RULE_CATALOG.site_classes_for(version).unwrap_or_default();
        println!("  {:<6} {}", version, classes.join(", "));
    }
    Ok(())
}

async fn cmd_serve(port: u16, remote: bool, legacy: bool) -> Result<(), Box<dyn std::error::Error>> {
    let enricher = build_enricher(remote, legacy, None)?;
    hazardtool::server::start_server(port, enricher).await
}
