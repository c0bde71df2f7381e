use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quartile_report::config::{LoadPolicy, ReportConfig};
use quartile_report::domain::entities::source::Source;
use quartile_report::error::ReportError;
use quartile_report::infra::export::xlsx::XlsxReportWriter;
use quartile_report::infra::import::AutoReader;
use quartile_report::infra::snapshot::json::JsonSnapshotStore;
use quartile_report::ui::render::{render_selection, render_table};
use quartile_report::ui::state::app_state::AppState;
use quartile_report::usecase::ports::export::{ReportSheet, ReportWriter};
use quartile_report::usecase::services::report_service::{PeriodInput, ReportService};
use quartile_report::usecase::services::selection_service::{
    apply_command, SelectionCommand, SelectionService,
};

const DEFAULT_PERIOD_LABEL: &str = "Report";

#[derive(Parser, Debug)]
#[command(name = "report", about = "Build the Format / Kategori performance report")]
struct Args {
    /// Format extract (workbook, or a directory of CSV sheets). Repeat per period.
    #[arg(long = "format")]
    format: Vec<PathBuf>,

    /// Kategori extract. Repeat per period, in the same order as --format.
    #[arg(long = "kategori")]
    kategori: Vec<PathBuf>,

    /// Period label, paired with the extracts by position.
    #[arg(long = "period")]
    period: Vec<String>,

    /// JSON config overriding the sheet/column mapping.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Abort on the first missing sheet or column.
    #[arg(long)]
    strict: bool,

    /// Selection snapshot to import.
    #[arg(long)]
    selection: Option<PathBuf>,

    /// Write the resulting selection to this file.
    #[arg(long = "save-selection")]
    save_selection: Option<PathBuf>,

    /// Import from and save to the snapshot in the data directory.
    #[arg(long)]
    remember: bool,

    #[arg(long = "select-format")]
    select_format: Vec<String>,

    #[arg(long = "select-kategori")]
    select_kategori: Vec<String>,

    #[arg(long = "clear-format")]
    clear_format: bool,

    #[arg(long = "clear-kategori")]
    clear_kategori: bool,

    #[arg(long = "lock-format")]
    lock_format: bool,

    #[arg(long = "lock-kategori")]
    lock_kategori: bool,

    /// Output workbook, defaults to Report_<MMDD>.xlsx.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long = "no-export")]
    no_export: bool,
}

impl Args {
    fn periods(&self) -> Vec<PeriodInput> {
        let count = self.format.len().max(self.kategori.len()).max(1);
        (0..count)
            .map(|idx| {
                let label = self.period.get(idx).cloned().unwrap_or_else(|| {
                    if count == 1 {
                        DEFAULT_PERIOD_LABEL.to_string()
                    } else {
                        format!("Period {}", idx + 1)
                    }
                });
                PeriodInput::new(
                    label,
                    self.format.get(idx).cloned(),
                    self.kategori.get(idx).cloned(),
                )
            })
            .collect()
    }

    fn commands(&self) -> Vec<SelectionCommand> {
        let mut commands = Vec::new();
        for (source, locked) in [
            (Source::Format, self.lock_format),
            (Source::Kategori, self.lock_kategori),
        ] {
            if locked {
                commands.push(SelectionCommand::SetLock(source, true));
            }
        }
        for (source, clear, keys) in [
            (Source::Format, self.clear_format, &self.select_format),
            (Source::Kategori, self.clear_kategori, &self.select_kategori),
        ] {
            if clear {
                commands.push(SelectionCommand::ClearAll(source));
            } else if !keys.is_empty() {
                commands.push(SelectionCommand::Set(source, keys.clone()));
            }
        }
        commands
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!("Report_{}.xlsx", chrono::Local::now().format("%m%d")))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if args.strict {
        config.load_policy = LoadPolicy::Strict;
    }
    let snapshot_path = if args.remember {
        Some(config.snapshot_path()?)
    } else {
        None
    };

    let service = ReportService::new(Box::new(AutoReader), config);
    let mut state = AppState::new();

    let import = args.selection.clone().or_else(|| snapshot_path.clone());
    let commands = args.commands();
    let pass = service.run_pass_with(&args.periods(), &mut state, |state, keys| {
        if let Some(path) = &import {
            let selection = SelectionService::new(Box::new(JsonSnapshotStore::new(path.clone())));
            if !selection.import(state, keys)? {
                warn!(path = %path.display(), "no selection snapshot applied");
            }
        }
        for command in commands {
            apply_command(state, command, keys);
        }
        Ok(())
    });
    let reports = match pass {
        Ok(reports) => reports,
        Err(ReportError::MissingInput(source)) => {
            let flag = match source {
                Source::Format => "--format",
                Source::Kategori => "--kategori",
            };
            eprintln!("Provide the {source} extract with {flag} to build the report.");
            std::process::exit(2);
        }
        Err(err @ ReportError::Snapshot(_)) => return Err(err).context("failed to import selection"),
        Err(err) => return Err(err).context("failed to build report"),
    };

    for report in &reports {
        println!("== {} ==", report.label);
        print!("{}", render_table(&report.table));
        for issue in &report.issues {
            println!("  ! {issue}");
        }
        println!();
    }
    print!("{}", render_selection(&state));
    println!("{}", state.status);

    if let Some(path) = args.save_selection.clone().or(snapshot_path) {
        let selection = SelectionService::new(Box::new(JsonSnapshotStore::new(path.clone())));
        selection
            .export(&state)
            .with_context(|| format!("failed to save selection: {}", path.display()))?;
        info!(path = %path.display(), "selection saved");
    }

    if !args.no_export {
        let output = args.output.clone().unwrap_or_else(default_output_path);
        let sheets: Vec<ReportSheet> = reports
            .into_iter()
            .map(|report| ReportSheet {
                name: report.label,
                table: report.table,
            })
            .collect();
        XlsxReportWriter
            .write(&sheets, &output)
            .with_context(|| format!("failed to export report: {}", output.display()))?;
        println!("Exported {}", output.display());
    }

    Ok(())
}
