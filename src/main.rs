mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chomsky::grammar::Grammar;
use chomsky::parser::{self, Strictness};
use chomsky::{batch, generator, scorer};
use cli::{Cli, Command};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_grammar(path: &Path, strict: bool) -> Result<Grammar> {
    let strictness = if strict { Strictness::Strict } else { Strictness::Lenient };

    match parser::parse_file(path, strictness) {
        Ok(grammar) => Ok(grammar),
        Err(errors) => {
            for error in &errors {
                eprintln!("{}", error);
            }
            bail!("could not load grammar `{}` ({} errors)", path.display(), errors.len())
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Parse { grammar, sentences, output_dir, name, strict } => {
            let grammar = load_grammar(&grammar, strict)?;
            batch::run_files(&grammar, &sentences, &output_dir, &name)?;
        }
        Command::Evaluate { gold, pred_dir, output_file } => {
            scorer::evaluate(&gold, &pred_dir, &output_file)?;
        }
        Command::Generate { grammar: path, amount, max_depth, seed, strict } => {
            let grammar = load_grammar(&path, strict)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            for _ in 0..amount {
                let sentence = generator::generate(&grammar, &mut rng, max_depth)
                    .with_context(|| format!("could not generate from `{}`", path.display()))?;
                println!("{}", sentence.join(" "));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("\x1b[31;49;1merror:\x1b[0m {:#}", error);
            ExitCode::FAILURE
        }
    }
}
