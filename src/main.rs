// ==========================================
// Setup Sheet Analyzer - CLI entry point
// ==========================================
// Usage:
//   setup-sheet-analyzer [--json|--csv] <report.html>...
//   setup-sheet-analyzer [--json|--csv] --project <id> [<report.html>...]
//   setup-sheet-analyzer --list-projects
//
// Without --project the reports are aggregated in memory (scale 1)
// and nothing is persisted. With --project the stored project is
// opened from the database, the given reports are added to it, and
// its ledger is printed.
// Database path: SETUP_SHEET_ANALYZER_DB_PATH or the user data dir
// ==========================================

use anyhow::{bail, Context};
use setup_sheet_analyzer::api::LedgerSnapshot;
use setup_sheet_analyzer::config::{default_db_path, ConfigManager};
use setup_sheet_analyzer::domain::{SortColumn, SortOrder};
use setup_sheet_analyzer::export::write_ledger_csv;
use setup_sheet_analyzer::importer::format_hhmmss;
use setup_sheet_analyzer::repository::SqliteLedgerStore;
use setup_sheet_analyzer::{logging, AggregationEngine, OperationCategory, ProjectApi, WorkspaceApi};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Default)]
struct CliArgs {
    format: Option<OutputFormat>,
    project_id: Option<String>,
    list_projects: bool,
    files: Vec<String>,
}

fn parse_args() -> anyhow::Result<Option<CliArgs>> {
    let mut cli = CliArgs::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => cli.format = Some(OutputFormat::Json),
            "--csv" => cli.format = Some(OutputFormat::Csv),
            "--project" => {
                let id = args.next().context("--project needs a project id")?;
                cli.project_id = Some(id);
            }
            "--list-projects" => cli.list_projects = true,
            "-h" | "--help" => return Ok(None),
            flag if flag.starts_with("--") => bail!("unknown option: {}", flag),
            _ => cli.files.push(arg),
        }
    }
    Ok(Some(cli))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let Some(cli) = parse_args()? else {
        print_usage();
        return Ok(());
    };
    let format = cli.format.unwrap_or(OutputFormat::Table);

    tracing::info!("{} v{}", setup_sheet_analyzer::APP_NAME, setup_sheet_analyzer::VERSION);

    if cli.list_projects {
        return list_projects().await;
    }

    let snapshot = match &cli.project_id {
        Some(project_id) => stored_project(project_id, &cli.files).await?,
        None => {
            if cli.files.is_empty() {
                print_usage();
                bail!("no report files given");
            }
            in_memory(&cli.files)?
        }
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
            println!("{}", json);
        }
        OutputFormat::Csv => {
            write_ledger_csv(&snapshot.rows, std::io::stdout().lock())
                .context("writing CSV")?;
        }
        OutputFormat::Table => print_table(&snapshot),
    }
    Ok(())
}

fn print_usage() {
    eprintln!("usage: setup-sheet-analyzer [--json|--csv] [--project <id>] <report.html>...");
    eprintln!("       setup-sheet-analyzer --list-projects");
}

/// Read a report; unreadable files are logged and skipped.
fn read_report(path: &str) -> Option<(String, String)> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(file = %path, error = %e, "cannot read report, skipped");
            return None;
        }
    };
    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    Some((content, file_name))
}

fn in_memory(files: &[String]) -> anyhow::Result<LedgerSnapshot> {
    let mut engine = AggregationEngine::new(None)?;
    engine.sort_by(SortColumn::Name, SortOrder::Asc);

    for path in files {
        let Some((content, file_name)) = read_report(path) else {
            continue;
        };
        if let Err(e) = engine.load_setup_sheet(&content, &file_name) {
            tracing::error!(file = %path, error = %e, "report rejected, skipped");
        }
    }
    Ok(LedgerSnapshot::from_engine(&engine))
}

fn open_store() -> anyhow::Result<(String, Arc<SqliteLedgerStore>)> {
    let db_path = default_db_path();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let store = SqliteLedgerStore::new(&db_path)
        .with_context(|| format!("opening database {}", db_path))?;
    tracing::info!(db_path = %db_path, "database opened");
    Ok((db_path, Arc::new(store)))
}

async fn stored_project(project_id: &str, files: &[String]) -> anyhow::Result<LedgerSnapshot> {
    let (db_path, store) = open_store()?;
    let config = ConfigManager::new(&db_path)?.load_analyzer_config()?;

    let mut api = ProjectApi::open(store, project_id, config).await?;
    for path in files {
        let Some((content, file_name)) = read_report(path) else {
            continue;
        };
        if let Err(e) = api.add_setup_sheet(&content, &file_name).await {
            tracing::error!(file = %path, error = %e, "report rejected, skipped");
        }
    }
    Ok(api.ledger_snapshot())
}

async fn list_projects() -> anyhow::Result<()> {
    let (_, store) = open_store()?;
    let workspace = WorkspaceApi::new(store);
    for summary in workspace.list_projects().await? {
        println!(
            "{}  {:<32} sheets={} scale={}",
            summary.project.id,
            summary.project.name,
            summary.setup_sheet_count,
            summary.project.scale
        );
    }
    Ok(())
}

fn print_table(snapshot: &LedgerSnapshot) {
    println!("{} sheet(s) loaded", snapshot.sheets.len());
    if snapshot.rows.is_empty() {
        println!("no tool usage");
        return;
    }

    print!("{:<24} {:>8}", "TOOL", "DIAMETER");
    for category in OperationCategory::ALL {
        print!(" {:>12}", category.as_str());
    }
    println!(" {:>12} {:>8} {:>10}", "TOTAL", "NEED", "COST");

    for row in &snapshot.rows {
        print!("{:<24} {:>8}", row.name, row.diameter);
        for category in OperationCategory::ALL {
            print!(" {:>12}", format_hhmmss(row.usage[category]));
        }
        println!(
            " {:>12} {:>8} {:>10}",
            format_hhmmss(row.total_usage),
            metric(row.need),
            metric(row.cost)
        );
    }
}

fn metric(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}
