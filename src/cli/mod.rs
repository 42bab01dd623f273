//! Command-line interface for deseq2_dashboard

use clap::{Args, Parser, Subcommand};

use crate::analysis::volcano::DEFAULT_VOLCANO_LABELS;
use crate::config::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USERNAME};
use crate::filter::{DEFAULT_FDR, DEFAULT_LFC};

#[derive(Parser)]
#[command(name = "deseq2_dashboard")]
#[command(version)]
#[command(about = "Interactive dashboard for DESeq2 differential expression results")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// The requested command; `serve` when none was named
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve(self.serve))
    }
}

/// Options for the web server
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Enable debug mode (ignored when PORT is set in the environment)
    #[arg(long)]
    pub debug: bool,

    /// Directory holding primary/ and secondary/ result folders
    #[arg(short, long, value_name = "DIR",
        long_help = "Directory holding primary/ and secondary/ result folders.\n\
            Without this, data/deseq2_results under the working directory is used\n\
            when present, else ../analysis_results/deseq2_results.")]
    pub results_dir: Option<String>,

    /// Require HTTP Basic Auth, generating a password if none is set
    #[arg(long)]
    pub auth: bool,

    /// Basic Auth username
    #[arg(long, env = "DASH_USERNAME", default_value = DEFAULT_USERNAME)]
    pub username: String,

    /// Basic Auth password (enables auth)
    #[arg(long, env = "DASH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard web server
    #[command(
        long_about = "Start the dashboard web server\n\n\
            Serves the volcano, fold-change scatter and Venn views over the result\n\
            tables found in the results directory.",
        after_long_help = "\
Examples:
  # Serve on the default port 8050
  deseq2_dashboard serve -r analysis_results/deseq2_results

  # Password-protected
  DASH_USERNAME=lab DASH_PASSWORD=secret deseq2_dashboard serve"
    )]
    Serve(ServeArgs),

    /// List discovered comparison files
    List {
        /// Results directory
        #[arg(short, long, value_name = "DIR")]
        results_dir: Option<String>,
    },

    /// Print the significant genes of one comparison
    Degs {
        /// Result table (TSV)
        file: String,

        /// Adjusted p-value threshold
        #[arg(long, default_value_t = DEFAULT_FDR)]
        fdr: f64,

        /// Absolute log2 fold change threshold
        #[arg(long, default_value_t = DEFAULT_LFC)]
        lfc: f64,
    },

    /// Partition the DEGs of two or three comparisons and write the overlap table
    #[command(after_long_help = "\
Examples:
  deseq2_dashboard overlap a_results.tsv b_results.tsv --fdr 0.01 --lfc 1.5")]
    Overlap {
        /// Result tables (two or three)
        #[arg(required = true, num_args = 2..=3)]
        files: Vec<String>,

        /// Adjusted p-value threshold
        #[arg(long, default_value_t = DEFAULT_FDR)]
        fdr: f64,

        /// Absolute log2 fold change threshold
        #[arg(long, default_value_t = DEFAULT_LFC)]
        lfc: f64,

        /// Output CSV path
        #[arg(short, long, default_value = "venn_diagram_overlaps.csv")]
        output: String,
    },

    /// Inner-join two comparisons on gene symbol
    Merge {
        /// First result table
        first: String,

        /// Second result table
        second: String,

        /// Output TSV path
        #[arg(short, long, default_value = "merged_results.tsv")]
        output: String,
    },

    /// Write the annotated volcano table of one comparison
    Volcano {
        /// Result table (TSV)
        file: String,

        /// Adjusted p-value threshold
        #[arg(long, default_value_t = DEFAULT_FDR)]
        fdr: f64,

        /// Absolute log2 fold change threshold
        #[arg(long, default_value_t = DEFAULT_LFC)]
        lfc: f64,

        /// Number of top genes to flag
        #[arg(long, default_value_t = DEFAULT_VOLCANO_LABELS)]
        n_labels: usize,

        /// Output CSV path
        #[arg(short, long, default_value = "deseq2_volcano_export.csv")]
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::parse_from(["deseq2_dashboard", "--port", "9001"]);
        match cli.into_command() {
            Commands::Serve(args) => assert_eq!(args.port, 9001),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_overlap_arity() {
        assert!(Cli::try_parse_from(["deseq2_dashboard", "overlap", "a.tsv"]).is_err());
        assert!(
            Cli::try_parse_from(["deseq2_dashboard", "overlap", "a.tsv", "b.tsv", "c.tsv", "d.tsv"]).is_err()
        );

        let cli = Cli::parse_from(["deseq2_dashboard", "overlap", "a.tsv", "b.tsv", "--fdr", "0.01"]);
        match cli.into_command() {
            Commands::Overlap { files, fdr, lfc, output } => {
                assert_eq!(files, vec!["a.tsv", "b.tsv"]);
                assert_eq!(fdr, 0.01);
                assert_eq!(lfc, DEFAULT_LFC);
                assert_eq!(output, "venn_diagram_overlaps.csv");
            }
            _ => panic!("expected overlap"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["deseq2_dashboard", "degs", "a.tsv", "-v"]);
        assert!(cli.verbose);
    }
}
