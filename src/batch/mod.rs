/*
    This module runs the recognizer over a file of sentences
*/

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;

use crate::chart::{recognize, Recognition};
use crate::grammar::Grammar;

pub const VISUALIZATION_SUFFIX: &str = "_viz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub sentences: usize,
    pub accepted: usize,
}

// What is kept of a recognition once the chart is dropped
struct Outcome {
    accepted: bool,
    derivations: usize,
}

fn recognize_line(grammar: &Grammar, line: &str) -> Outcome {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    match recognize(grammar, &tokens) {
        Recognition::Accepted(backpointers) => Outcome {
            accepted: true,
            derivations: backpointers.total(),
        },
        Recognition::Rejected => Outcome {
            accepted: false,
            derivations: 0,
        },
    }
}

/// Writes the visualization block for one sentence. Parse counting is not
/// done, so accepted sentences only say so.
pub fn write_visualization<W: Write>(out: &mut W, sentence: &str, accepted: bool) -> std::io::Result<()> {
    if accepted {
        write!(out, "{}\nParses: not counted\n\n", sentence)
    } else {
        write!(out, "{}\nParses: 0\n\n", sentence)
    }
}

/// Recognizes every line of `sentences` and writes one verdict line per
/// sentence, in input order, along with its visualization block.
pub fn run<R, V, Z>(grammar: &Grammar, sentences: R, verdicts: &mut V, visualization: &mut Z) -> Result<BatchSummary>
where
    R: BufRead,
    V: Write,
    Z: Write,
{
    let lines = sentences
        .lines()
        .map(|line| line.map(|line| line.trim().to_string()))
        .collect::<std::io::Result<Vec<_>>>()
        .context("failed to read sentences")?;

    let outcomes = lines
        .par_iter()
        .map(|line| recognize_line(grammar, line))
        .collect::<Vec<_>>();

    let mut summary = BatchSummary::default();
    for (num, (line, outcome)) in lines.iter().zip(&outcomes).enumerate() {
        debug!(
            "sentence {}: {} ({} derivations)",
            num + 1,
            if outcome.accepted { "accepted" } else { "rejected" },
            outcome.derivations
        );
        summary.sentences += 1;
        if outcome.accepted {
            summary.accepted += 1;
        }

        writeln!(verdicts, "{}", if outcome.accepted { "1" } else { "0" })
            .context("failed to write verdict")?;
        write_visualization(visualization, line, outcome.accepted)
            .context("failed to write visualization")?;
    }

    verdicts.flush().context("failed to write verdicts")?;
    visualization.flush().context("failed to write visualization")?;
    Ok(summary)
}

pub fn output_paths(output_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!("{}.txt", name)),
        output_dir.join(format!("{}{}.txt", name, VISUALIZATION_SUFFIX)),
    )
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("failed to create `{}`", path.display()))
}

/// Runs a sentence file, writing `<name>.txt` and `<name>_viz.txt` into
/// `output_dir`, which is created if needed.
pub fn run_files(grammar: &Grammar, sentences_path: &Path, output_dir: &Path, name: &str) -> Result<BatchSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create `{}`", output_dir.display()))?;

    let sentences = File::open(sentences_path)
        .with_context(|| format!("failed to open `{}`", sentences_path.display()))?;
    let (verdicts_path, visualization_path) = output_paths(output_dir, name);

    let summary = run(
        grammar,
        BufReader::new(sentences),
        &mut create(&verdicts_path)?,
        &mut create(&visualization_path)?,
    )
    .with_context(|| format!("failed to process `{}`", sentences_path.display()))?;

    info!(
        "{} of {} sentences accepted, verdicts written to {}",
        summary.accepted,
        summary.sentences,
        verdicts_path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse_file, Strictness};

    use super::*;

    fn english() -> Grammar {
        parse_file(Path::new("example_data/english.cnf"), Strictness::Strict).unwrap()
    }

    fn run_text(grammar: &Grammar, text: &str) -> (BatchSummary, String, String) {
        let mut verdicts = Vec::new();
        let mut visualization = Vec::new();
        let summary = run(grammar, text.as_bytes(), &mut verdicts, &mut visualization).unwrap();
        (
            summary,
            String::from_utf8(verdicts).unwrap(),
            String::from_utf8(visualization).unwrap(),
        )
    }

    #[test]
    fn one_verdict_per_line_in_order() {
        let sentences = std::fs::read_to_string("example_data/sentences.txt").unwrap();
        let gold = std::fs::read_to_string("example_data/gold.txt").unwrap();

        let (summary, verdicts, _) = run_text(&english(), &sentences);
        assert_eq!(verdicts, gold);
        assert_eq!(summary, BatchSummary { sentences: 6, accepted: 3 });
    }

    #[test]
    fn blank_lines_are_rejected_not_skipped() {
        let (summary, verdicts, visualization) = run_text(&english(), "she saw a dog\n\n  she saw a dog  \n");
        assert_eq!(verdicts, "1\n0\n1\n");
        assert_eq!(summary.sentences, 3);
        assert_eq!(visualization, "she saw a dog\nParses: not counted\n\n\nParses: 0\n\nshe saw a dog\nParses: not counted\n\n");
    }

    #[test]
    fn visualization_blocks() {
        let mut out = Vec::new();
        write_visualization(&mut out, "the cat", false).unwrap();
        write_visualization(&mut out, "the dog", true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "the cat\nParses: 0\n\nthe dog\nParses: not counted\n\n");
    }

    #[test]
    fn writes_both_files() {
        let output_dir = std::env::temp_dir()
            .join(format!("chomsky-batch-{}", std::process::id()))
            .join("nested");
        let summary = run_files(
            &english(),
            Path::new("example_data/sentences.txt"),
            &output_dir,
            "verdicts",
        ).unwrap();
        assert_eq!(summary.accepted, 3);

        let (verdicts_path, visualization_path) = output_paths(&output_dir, "verdicts");
        assert_eq!(
            std::fs::read_to_string(verdicts_path).unwrap(),
            std::fs::read_to_string("example_data/gold.txt").unwrap()
        );
        assert!(std::fs::read_to_string(visualization_path).unwrap().starts_with("she saw the man\n"));

        std::fs::remove_dir_all(output_dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn missing_sentence_file() {
        let output_dir = std::env::temp_dir().join(format!("chomsky-missing-{}", std::process::id()));
        let error = run_files(&english(), Path::new("example_data/nope.txt"), &output_dir, "verdicts").unwrap_err();
        assert!(error.to_string().contains("nope.txt"));
        std::fs::remove_dir_all(output_dir).unwrap();
    }
}
