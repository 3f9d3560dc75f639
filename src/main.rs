use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use topomap::config::{load_config, AnalysisConfig};
use topomap::extraction::ExtractorRegistry;
use topomap::pipeline::AnalysisPipeline;
use topomap::schema::SchemaDescription;

/// Dependency topology mapping for polyglot codebases.
#[derive(Parser)]
#[command(
    name = "topomap",
    about = "Dependency topology mapping for polyglot codebases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a repository and emit a topology snapshot
    Analyze {
        /// Repository path (default: current directory)
        path: Option<String>,
        /// Database schema description (JSON)
        #[arg(short, long)]
        schema: Option<PathBuf>,
        /// Output path for the snapshot JSON
        #[arg(short, long, default_value = "topology.json")]
        output: PathBuf,
        /// Also write a markdown digest next to the snapshot
        #[arg(short, long)]
        markdown: bool,
        /// Analysis configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Extract a single source file and print its record
    Extract {
        /// Source file to extract
        file: PathBuf,
    },
    /// List the supported languages
    Languages,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> topomap::errors::Result<()> {
    match cli.command {
        Commands::Analyze {
            path,
            schema,
            output,
            markdown,
            config,
        } => {
            let root = resolve_path(path);
            let config = match config {
                Some(p) => load_config(&p)?,
                None => AnalysisConfig::default(),
            };
            let schema = match schema {
                Some(p) => SchemaDescription::load(&p)?,
                None => SchemaDescription::empty(),
            };

            let pipeline = AnalysisPipeline::new(&root, config)?;
            let (snapshot, summary) = pipeline.run(&schema)?;
            snapshot.write_json(&output)?;
            println!(
                "Analyzed {} files: {} nodes, {} edges, {} SPOFs, {} cycles in {}ms",
                summary.file_count,
                snapshot.statistics.total_nodes,
                snapshot.statistics.total_edges,
                snapshot.statistics.spof_count,
                snapshot.circular_dependencies.len(),
                summary.duration_ms
            );
            if summary.parse_failures > 0 {
                println!("  {} files could not be parsed", summary.parse_failures);
            }
            println!("Snapshot written to {}", output.display());

            if markdown {
                let md_path = output.with_extension("md");
                snapshot.write_markdown(&md_path)?;
                println!("Digest written to {}", md_path.display());
            }
        }
        Commands::Extract { file } => {
            let root = file
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let pipeline = AnalysisPipeline::new(&root, AnalysisConfig::default())?;
            match pipeline.extract_one(&file)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("Unsupported file type: {}", file.display()),
            }
        }
        Commands::Languages => {
            let registry = ExtractorRegistry::new()?;
            for language in registry.supported_languages() {
                println!("{}", language.as_str());
            }
        }
    }
    Ok(())
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
