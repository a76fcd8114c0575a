use std::path::PathBuf;
use std::process;

use clap::Parser;
use flag_quiz::{CandidateCatalog, FlagQuiz, QuizConfig, QuizError};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON catalog of flags grouped by region
    #[arg(short, long, default_value = "countries.json")]
    countries: PathBuf,

    /// Choices shown per flag: 3, 6 or 9
    #[arg(short = 'n', long, default_value = "6")]
    choices: String,

    /// Regions to draw flags from (defaults to every region in the catalog)
    #[arg(short, long, value_delimiter = ',')]
    regions: Vec<String>,
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error running quiz: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), QuizError> {
    let catalog = CandidateCatalog::from_json(&args.countries)?;

    let regions = if args.regions.is_empty() {
        catalog.regions().map(str::to_owned).collect()
    } else {
        args.regions
    };
    let config = QuizConfig::parse(&args.choices, &regions)?;

    FlagQuiz::new(catalog, config)?.run().await
}
