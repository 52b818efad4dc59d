//! CLI for udf2pdf - batch converter for packaged court documents

use clap::Parser;
use std::path::PathBuf;
use udf2pdf::batch::{self, BatchOptions, FileOutcome};
use udf2pdf::{ConversionMode, ConvertOptions, FontConfig, TemplateKind};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the documents to convert
    #[arg(default_value = "evraklar_kaynak")]
    source: PathBuf,

    /// Directory the converted files are written to
    #[arg(short, long, default_value = "evraklar_pdf")]
    output: PathBuf,

    /// Conversion pipeline: flat, professional, structured, text, plain-text
    #[arg(short, long, default_value = "flat")]
    mode: ConversionMode,

    /// Input file extension (default: txt for plain-text, udf otherwise)
    #[arg(long)]
    ext: Option<String>,

    /// Keep existing output files instead of deleting them first
    #[arg(long)]
    no_clean: bool,

    /// Regular TrueType font to embed
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold TrueType font to embed
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Omit the document header in flat mode
    #[arg(long)]
    no_header: bool,

    /// Source template: uyap or none
    #[arg(long, default_value = "uyap")]
    template: TemplateKind,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let defaults = FontConfig::default();
    let options = BatchOptions {
        source_dir: args.source,
        output_dir: args.output,
        input_extension: args.ext,
        clean_output: !args.no_clean,
        convert: ConvertOptions {
            mode: args.mode,
            fonts: FontConfig {
                regular: args.font.unwrap_or(defaults.regular),
                bold: args.bold_font.unwrap_or(defaults.bold),
            },
            template: args.template,
            header: !args.no_header,
        },
    };

    let report = match batch::run(&options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if report.total() == 0 {
        println!(
            "No .{} files found in {}",
            options.input_extension(),
            options.source_dir.display()
        );
        return;
    }

    for outcome in &report.outcomes {
        let name = outcome
            .input()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match outcome {
            FileOutcome::Converted { output, .. } => {
                println!("✓ {} -> {}", name, output.display());
            }
            FileOutcome::Failed { reason, .. } => println!("✗ {}: {}", name, reason),
        }
    }
    println!(
        "{}/{} converted, {} failed",
        report.succeeded(),
        report.total(),
        report.failed()
    );
}
