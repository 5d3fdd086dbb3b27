use crate::catalog::{DirectorySource, GithubSource, QuestionAggregator};
use crate::config::presets::question_template;
use crate::config::settings::SqlboxConfig;
use crate::config::types::{Question, ResultSet};
use crate::core::session::{Session, SessionState};
use crate::engine::sqlite::SqliteEngine;
use crate::observability::metrics::get_metrics;
use crate::utils::json_schema::RunReportV1;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./sqlbox.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Skip every question source and use the built-in questions
    #[arg(long, global = true)]
    offline: bool,
    /// Load questions from a local folder instead of the remote repository
    #[arg(long, global = true, value_name = "DIR")]
    questions_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the loaded questions
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one question's prompt, hint and expected columns
    Show {
        /// Question id as shown by `list`
        #[arg(long)]
        question: u32,
    },
    /// Run a query against a fresh sandbox for a question and judge it
    Run {
        /// Question id as shown by `list`
        #[arg(long)]
        question: u32,
        /// SQL text to run
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        query: Option<String>,
        /// File holding the SQL to run
        #[arg(long)]
        file: Option<PathBuf>,
        /// Question documents to append before selecting (repeatable)
        #[arg(long = "import", value_name = "PATH")]
        imports: Vec<PathBuf>,
        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print an authoring template for a new question document
    Template,
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if let Commands::Template = cli.command {
        println!("{}", serde_json::to_string_pretty(&question_template())?);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => SqlboxConfig::load_from_file(path)?,
        None => SqlboxConfig::load_default()?,
    };
    if cli.offline {
        config.offline = true;
    }
    if let Some(dir) = cli.questions_dir {
        config.questions_dir = Some(dir);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let engine = SqliteEngine::init()?;
    log::debug!("Using SQLite {}", engine.version());
    let mut session = Session::new(build_aggregator(&config)?, Arc::new(engine));
    runtime.block_on(session.reload());

    let passed = dispatch(&mut session, cli.command);
    log::debug!(
        "Metrics at exit:\n{}",
        get_metrics().export_prometheus().trim_end()
    );
    if !passed? {
        std::process::exit(1);
    }
    Ok(())
}

/// Carry out one command on a loaded session. `Ok(false)` means the run was
/// judged incorrect or failed.
fn dispatch(session: &mut Session, command: Commands) -> Result<bool> {
    match command {
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.questions())?);
            } else {
                for question in session.questions() {
                    println!("{}", list_line(question));
                }
            }
            Ok(true)
        }
        Commands::Show { question } => {
            let question = session
                .questions()
                .iter()
                .find(|q| q.id == question)
                .ok_or_else(|| anyhow!("no question with id {}", question))?;
            print!("{}", describe_question(question));
            Ok(true)
        }
        Commands::Run {
            question,
            query,
            file,
            imports,
            json,
        } => {
            for path in &imports {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let imported = session.import(&text, &display_name(path))?;
                eprintln!("Imported {} question(s) from {}", imported.len(), path.display());
            }

            let index = session
                .aggregator()
                .index_of(question)
                .ok_or_else(|| anyhow!("no question with id {}", question))?;
            session.select(index)?;
            if let SessionState::QuestionsReady { schema_error, .. } = session.state() {
                return Err(anyhow!(schema_error.clone()));
            }

            let query = match (query, file) {
                (Some(query), _) => query,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => return Err(anyhow!("either --query or --file is required")),
            };

            let start = chrono::Utc::now();
            let result = session.submit(&query);
            let end = chrono::Utc::now();

            let selected = session
                .selected_question()
                .ok_or_else(|| anyhow!("question {} is no longer selected", question))?;
            let report = match &result {
                Ok(outcome) => RunReportV1::from_outcome(selected, outcome, start, end),
                Err(e) => RunReportV1::from_error(selected, e, start, end),
            };

            if json {
                println!("{}", report.to_json()?);
            } else {
                match &result {
                    Ok(outcome) => {
                        print!("{}", render_table(&outcome.displayed));
                        if outcome.verdict.correct {
                            println!("Correct!");
                        } else {
                            println!("Incorrect ({})", outcome.verdict.cause.as_str());
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }

            Ok(report.is_correct())
        }
        Commands::Template => Ok(true),
    }
}

fn build_aggregator(config: &SqlboxConfig) -> Result<QuestionAggregator> {
    if config.offline {
        return Ok(QuestionAggregator::offline());
    }
    let extensions = config.source.extensions.clone();
    if let Some(dir) = &config.questions_dir {
        return Ok(QuestionAggregator::new(
            Box::new(DirectorySource::new(dir)),
            extensions,
        ));
    }
    let source = GithubSource::new(&config.source)?;
    Ok(QuestionAggregator::new(Box::new(source), extensions))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn list_line(question: &Question) -> String {
    format!(
        "{:>3}  {:<8} {}  [{}]",
        question.id,
        question.difficulty.to_string(),
        question.title,
        question.source_name
    )
}

fn describe_question(question: &Question) -> String {
    let mut out = format!(
        "#{} {} ({})\n\n{}\n",
        question.id, question.title, question.difficulty, question.description
    );
    if !question.hint.is_empty() {
        out.push_str(&format!("\nHint: {}\n", question.hint));
    }
    out.push_str(&format!(
        "\nExpected columns: {}\n",
        question.expected_result.columns.join(", ")
    ));
    out
}

/// Plain-text grid of a result set; non-tabular results render a notice.
fn render_table(set: &ResultSet) -> String {
    if !set.is_tabular() {
        return "(no rows returned)\n".to_string();
    }

    let cells: Vec<Vec<String>> = set
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    let mut widths: Vec<usize> = set.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", v, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&set.columns);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row));
        out.push('\n');
    }
    out.push_str(&format!("({} row(s))\n", set.row_count()));
    out
}
