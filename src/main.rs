use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Clean a raw salary dataset and write grouped summary reports.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the raw salary CSV.
    input: PathBuf,

    /// Directory the report files are written to.
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Report file format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let reports = salary_lens::run(&cli.input)
        .with_context(|| format!("processing {}", cli.input.display()))?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    for report in &reports {
        let (ext, body) = match cli.format {
            OutputFormat::Csv => {
                let mut buf = Vec::new();
                report
                    .write_csv(&mut buf)
                    .with_context(|| format!("serializing report '{}'", report.title))?;
                ("csv", buf)
            }
            OutputFormat::Json => {
                let json = report
                    .to_json()
                    .with_context(|| format!("serializing report '{}'", report.title))?;
                ("json", json.into_bytes())
            }
        };

        let path = cli.out_dir.join(format!("{}.{ext}", report.title));
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {} ({} groups)", path.display(), report.rows.len());
    }

    println!(
        "Wrote {} reports to {}",
        reports.len(),
        cli.out_dir.display()
    );
    Ok(())
}
