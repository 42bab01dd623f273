//! deseq2_dashboard command-line interface

use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};

use deseq2_dashboard::analysis::{annotate, Direction};
use deseq2_dashboard::catalog::{option_label, resolve_results_dir};
use deseq2_dashboard::cli::{Cli, Commands, ServeArgs};
use deseq2_dashboard::prelude::*;
use deseq2_dashboard::{report_degs, server, write_merged, write_overlaps};

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let command = cli.into_command();

    // Set up logging
    let debug = matches!(&command, Commands::Serve(args) if args.debug);
    let log_level = if verbose || debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match command {
        Commands::Serve(args) => run_server(&args),
        Commands::List { results_dir } => run_list(results_dir),
        Commands::Degs { file, fdr, lfc } => run_degs(&file, fdr, lfc),
        Commands::Overlap {
            files,
            fdr,
            lfc,
            output,
        } => run_overlap(&files, fdr, lfc, &output),
        Commands::Merge {
            first,
            second,
            output,
        } => run_merge(&first, &second, &output),
        Commands::Volcano {
            file,
            fdr,
            lfc,
            n_labels,
            output,
        } => run_volcano(&file, fdr, lfc, n_labels, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_server(args: &ServeArgs) -> Result<()> {
    let config = ServerConfig::from_args(args)?;
    info!("Results directory: {}", config.results_dir.display());
    actix_web::rt::System::new().block_on(server::run(config))?;
    Ok(())
}

fn run_list(results_dir: Option<String>) -> Result<()> {
    let root = match results_dir {
        Some(dir) => PathBuf::from(dir),
        None => resolve_results_dir(&std::env::current_dir()?),
    };
    info!("Scanning {}", root.display());

    let entries = discover(&root);
    if entries.is_empty() {
        info!("No comparison files found");
    }
    for entry in &entries {
        println!("{}\t{}", option_label(entry), entry.path.display());
    }
    Ok(())
}

fn run_degs(file: &str, fdr: f64, lfc: f64) -> Result<()> {
    let loader = ResultLoader::new();
    let (summary, degs) = report_degs(&loader, file, fdr, lfc)?;
    info!("{}", summary);
    info!(
        "{} DEGs in {} (FDR < {}, |log2FC| > {})",
        degs.len(),
        short_name(file),
        fdr,
        lfc
    );
    for gene in &degs.genes {
        println!("{}", gene);
    }
    Ok(())
}

fn run_overlap(files: &[String], fdr: f64, lfc: f64, output: &str) -> Result<()> {
    let loader = ResultLoader::new();
    let summary = write_overlaps(&loader, files, fdr, lfc, output)?;
    info!("{}", summary.counts_line());
    for list in summary.gene_lists() {
        info!("  {}: {}", list.title, list.total);
    }
    Ok(())
}

fn run_merge(first: &str, second: &str, output: &str) -> Result<()> {
    let loader = ResultLoader::new();
    let merged = write_merged(&loader, first, second, output)?;
    info!(
        "{} genes shared by {} and {}",
        merged.n_genes(),
        short_name(first),
        short_name(second)
    );
    Ok(())
}

fn run_volcano(file: &str, fdr: f64, lfc: f64, n_labels: usize, output: &str) -> Result<()> {
    let loader = ResultLoader::new();
    let table = loader.load(file)?;
    let params = VolcanoParams {
        fdr,
        lfc,
        search: None,
        n_labels,
    };
    let volcano = annotate(table, &params);

    std::fs::write(output, volcano.to_csv()?)?;
    info!(
        "{} genes: {} up, {} down. Written to {}",
        volcano.n_genes(),
        volcano.count(Direction::Up),
        volcano.count(Direction::Down),
        output
    );
    Ok(())
}
