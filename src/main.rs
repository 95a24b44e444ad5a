use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use sortfiles::{init_tracing, Organizer, OrganizerConfig, RunReport};

#[derive(Parser)]
#[command(name = "sortfiles")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sort a folder into category folders, unpack archives and normalize file names")]
struct Cli {
    /// Folder to organize
    target_folder: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let organizer = Organizer::new(OrganizerConfig::default());

    match organizer.run(&cli.target_folder).await {
        Ok(report) => {
            print_summary(&report);
            match serde_json::to_string(&report) {
                Ok(json) => tracing::debug!(report = %json, "Run report"),
                Err(e) => tracing::debug!(error = %e, "Failed to serialize run report"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_summary(report: &RunReport) {
    println!();
    println!("Organized {}", report.root.display());
    for stage in &report.stages {
        print!(
            "{:<24} {:>6} done",
            stage.stage,
            stage.completed_count + stage.renamed_count
        );
        if stage.skipped_count > 0 {
            print!(", {} skipped", stage.skipped_count);
        }
        if stage.failed_count > 0 {
            print!(", {} failed", stage.failed_count);
        }
        println!();
    }

    if !report.success() {
        println!();
        println!("{} operation(s) failed:", report.total_failed());
        for error in report.stages.iter().flat_map(|s| s.errors.iter()) {
            println!("  {}", error);
        }
    }
}
