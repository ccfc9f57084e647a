// pairstat CLI
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pairstat::config::AnalysisConfig;
use pairstat::datagen::{generate_dataset, write_csv, TrueParams};
use pairstat::pipeline::{analyze_pairs, load_observations, run_analysis_with};
use pairstat::plot::render_boxplot;
use pairstat::report::{format_summary, format_test, to_json};
use pairstat::summary::describe;

#[derive(Parser)]
#[command(name = "pairstat")]
#[command(version)]
#[command(about = "Paired-sample statistics: summary, boxplot, Wilcoxon signed-rank, Cohen's r", long_about = None)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input CSV file
    #[arg(value_name = "INPUT", default_value = "data.csv")]
    input: PathBuf,

    /// JSON configuration file (column names, delimiter, plot settings)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

impl InputArgs {
    fn load_config(&self) -> Result<AnalysisConfig> {
        match &self.config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display())),
            None => Ok(AnalysisConfig::default()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole analysis: summary, boxplot, paired test, effect size
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Boxplot image (.png or .svg); overrides the config
        #[arg(short, long, value_name = "PLOT")]
        plot: Option<PathBuf>,

        /// Skip rendering the boxplot
        #[arg(long)]
        no_plot: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print descriptive statistics per condition
    Describe {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Run the Wilcoxon signed-rank test and report Cohen's r
    Test {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Render the boxplot with group means
    Plot {
        #[command(flatten)]
        input: InputArgs,

        /// Output image (.png or .svg)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Generate a synthetic paired dataset
    GenerateData {
        /// Number of subjects
        #[arg(short = 'n', long, default_value = "20")]
        n_subjects: usize,

        /// Output CSV file
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Mean shift of the second condition
        #[arg(long, default_value = "8.0")]
        effect: f64,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// JSON configuration file (column names)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Run {
            input,
            plot,
            no_plot,
            format,
        } => run_command(input, plot, no_plot, format),
        Commands::Describe { input, format } => describe_command(input, format),
        Commands::Test { input, format } => test_command(input, format),
        Commands::Plot { input, output } => plot_command(input, output),
        Commands::GenerateData {
            n_subjects,
            output,
            effect,
            seed,
            config,
        } => generate_data_command(n_subjects, output, effect, seed, config),
    }
}

fn run_command(
    input: InputArgs,
    plot: Option<PathBuf>,
    no_plot: bool,
    format: Format,
) -> Result<()> {
    let mut config = input.load_config()?;
    if let Some(path) = plot {
        config.plot.output = path;
    }
    if no_plot {
        config.plot.enabled = false;
    }

    let report = run_analysis_with(&input.input, &config, |summary| {
        if format == Format::Text {
            println!("{}", format_summary(summary));
        }
    })
    .with_context(|| format!("Analysis failed for: {}", input.input.display()))?;

    match format {
        Format::Text => println!("{}", format_test(&report.test)),
        Format::Json => println!("{}", to_json(&report)?),
    }

    Ok(())
}

fn describe_command(input: InputArgs, format: Format) -> Result<()> {
    let config = input.load_config()?;
    let table = load_observations(&input.input, &config)
        .with_context(|| format!("Failed to load data from: {}", input.input.display()))?;
    let summary = describe(&table);

    match format {
        Format::Text => println!("{}", format_summary(&summary)),
        Format::Json => println!("{}", to_json(&summary)?),
    }
    Ok(())
}

fn test_command(input: InputArgs, format: Format) -> Result<()> {
    let config = input.load_config()?;
    let table = load_observations(&input.input, &config)
        .with_context(|| format!("Failed to load data from: {}", input.input.display()))?;
    let test = analyze_pairs(&table).context("Paired test failed")?;

    match format {
        Format::Text => println!("{}", format_test(&test)),
        Format::Json => println!("{}", to_json(&test)?),
    }
    Ok(())
}

fn plot_command(input: InputArgs, output: Option<PathBuf>) -> Result<()> {
    let mut config = input.load_config()?;
    if let Some(path) = output {
        config.plot.output = path;
    }

    let table = load_observations(&input.input, &config)
        .with_context(|| format!("Failed to load data from: {}", input.input.display()))?;
    let summary = describe(&table);

    render_boxplot(&table, &summary, &config.plot)
        .with_context(|| format!("Failed to render boxplot: {}", config.plot.output.display()))?;

    println!("✓ Boxplot written: {}", config.plot.output.display());
    Ok(())
}

fn generate_data_command(
    n_subjects: usize,
    output: PathBuf,
    effect: f64,
    seed: u64,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => AnalysisConfig::load(&path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let mut params = TrueParams::default();
    if let Some(second) = params.conditions.get_mut(1) {
        second.1 = effect;
    }
    log::debug!(
        "generating {} subjects, seed {}, params {:?}",
        n_subjects,
        seed,
        params
    );

    let dataset = generate_dataset(n_subjects, &params, seed)?;
    write_csv(&output, &config.columns, &dataset)
        .with_context(|| format!("Failed to write CSV: {}", output.display()))?;

    println!("✓ Generated: {}", output.display());
    println!("  Subjects: {}", n_subjects);
    println!("  Total rows: {}", dataset.len());
    Ok(())
}
