use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use chomsky::generator::DEFAULT_MAX_DEPTH;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand)]
pub enum Command {
    /// Decide which sentences of a file the grammar generates
    Parse {
        /// File containing the CNF grammar
        grammar: PathBuf,

        /// File containing one sentence per line
        sentences: PathBuf,

        /// Directory the verdict and visualization files are written to
        output_dir: PathBuf,

        /// Base name of the output files
        #[arg(long, value_name = "NAME", default_value = "verdicts")]
        name: String,

        /// Refuse grammars that use nonterminals without rules
        #[arg(long)]
        strict: bool
    },

    /// Score verdict files against gold labels
    Evaluate {
        /// File with one gold label per line
        gold: PathBuf,

        /// Directory containing the verdict files to score
        pred_dir: PathBuf,

        /// File the scores are written to
        output_file: PathBuf
    },

    /// Generate random sentences from a grammar
    Generate {
        /// File containing the CNF grammar
        grammar: PathBuf,

        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Depth after which only unary rules are used
        #[arg(long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Seed for reproducible output
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Refuse grammars that use nonterminals without rules
        #[arg(long)]
        strict: bool
    }
}
