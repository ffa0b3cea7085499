use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use retidiag_lib::config::{self, ReportConfig};
use retidiag_lib::report::{BatchOrchestrator, BatchReport, RecordOutcome};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "retidiag")]
#[command(about = "Generate retinographic PDF reports and a batch summary from a screening workbook")]
#[command(version)]
struct Args {
    /// Workbook with the INPUT sheet (.xlsx / .xlsm). Defaults to the template in Downloads
    input: Option<PathBuf>,

    /// Root folder for the reports [default: Documents/informes retidiag]
    output: Option<PathBuf>,

    /// Folder holding logos/ and firmas/
    #[arg(long, env = config::ASSETS_ENV, default_value_os_t = config::default_assets_dir())]
    assets: PathBuf,

    /// Worksheet to read
    #[arg(long, default_value = config::INPUT_SHEET)]
    sheet: String,

    /// Print the batch result as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

fn print_summary(report: &BatchReport) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("RESUMEN:");
    println!("  - Comuna: {}", report.context.region);
    println!("  - Establecimiento: {}", report.context.institution);
    println!("  - Fecha examen: {}", report.context.date_tag);
    println!("  - PDFs generados exitosamente: {}", report.rendered);
    println!("  - Errores: {}", report.failed);
    for outcome in &report.outcomes {
        if let RecordOutcome::Failed {
            patient, id, reason, ..
        } = outcome
        {
            println!("      ✗ {patient} ({id}): {reason}");
        }
    }
    println!("  - Resumen: {}", report.summary_path.display());
    println!("  - Ubicación: {}", report.output_dir.display());
    println!("{rule}\n");
}

fn main() -> ExitCode {
    let args = Args::parse();
    retidiag_lib::init_tracing();

    let input = match args.input {
        Some(path) => path,
        None => {
            let fallback = config::default_input_path();
            if !fallback.exists() {
                eprintln!("{}", Args::command().render_usage());
                eprintln!("\nEjemplo:");
                eprintln!("  retidiag datos_pacientes.xlsx");
                eprintln!("  retidiag datos_pacientes.xlsx ./mis_informes");
                return ExitCode::from(1);
            }
            fallback
        }
    };

    let output = args.output.unwrap_or_else(config::default_output_dir);
    let report_config = ReportConfig::new(output, args.assets).with_sheet(args.sheet);
    let orchestrator = BatchOrchestrator::new(report_config);

    match orchestrator.run_file(&input) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("ERROR: {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_summary(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, fatal = e.is_fatal(), "Batch aborted");
            eprintln!("ERROR: {e}");
            ExitCode::from(1)
        }
    }
}
