use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use reqres_tester::runner::{self, RunOptions};
use reqres_tester::utils::config::Config;
use reqres_tester::{report, suites};

#[derive(Parser)]
#[command(name = "reqres-tester")]
#[command(version)]
#[command(about = "API test suite for the ReqRes demo API with Allure reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the registered API tests
    Run {
        /// Filter tests by tags (comma-separated, all must match)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,

        /// Run only tests whose identifier contains this text
        #[arg(short, long)]
        name: Option<String>,

        /// Target API base URL (overrides API_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Allure results directory (overrides ALLURE_RESULTS_DIR)
        #[arg(long)]
        alluredir: Option<PathBuf>,

        /// Remove stale result files before running
        #[arg(long, default_value = "false")]
        clean: bool,

        /// Stop after the first failing test
        #[arg(long, default_value = "false")]
        fail_fast: bool,

        /// Do not write Allure result files
        #[arg(long, default_value = "false")]
        no_allure: bool,

        /// Generate reports (JSON, JUnit)
        #[arg(long, default_value = "false")]
        report: bool,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// List registered tests
    List {
        /// Filter tests by tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Generate report from test results
    Report {
        /// Path to test-results.json or an Allure results directory
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            tags,
            name,
            base_url,
            alluredir,
            clean,
            fail_fast,
            no_allure,
            report,
            output,
        } => {
            let mut config = Config::from_env().with_overrides(base_url, alluredir);
            config.clean_results = clean;
            config.fail_fast = fail_fast;

            println!("{} Running ReqRes API tests", "▶".green().bold());
            if let Some(ref tags_list) = tags {
                println!("  Tags: {}", tags_list.join(", ").yellow());
            }
            if let Some(ref filter) = name {
                println!("  Name: {}", filter.cyan());
            }
            if no_allure {
                println!("  Allure: {}", "Disabled".yellow());
            } else {
                println!(
                    "  Allure results: {}",
                    config.results_dir.display().to_string().cyan()
                );
            }
            if report {
                println!("  Reports: {}", output.display().to_string().cyan());
            }

            let options = RunOptions {
                tags,
                name,
                report,
                output,
                no_allure,
            };
            let summary = runner::run_tests(&config, &options)?;
            if !summary.is_success() {
                std::process::exit(1);
            }
        }

        Commands::List { tags } => {
            let cases = suites::registry();
            let selected = runner::registry::select(&cases, tags.as_deref(), None);
            for case in &selected {
                println!(
                    "{} {} [{}]",
                    "•".cyan(),
                    case.id,
                    case.meta.severity.as_str().yellow()
                );
                println!(
                    "    {} / {} / {}: {}",
                    case.meta.epic,
                    case.meta.feature,
                    case.meta.story,
                    case.meta.title.dimmed()
                );
                if !case.meta.tags.is_empty() {
                    println!("    tags: {}", case.meta.tags.join(", "));
                }
            }
            println!("\n{} test(s)", selected.len());
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
        }
    }

    Ok(())
}
