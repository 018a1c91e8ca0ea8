/*
    This module scores verdict files against gold labels
*/

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::batch::VISUALIZATION_SUFFIX;

const EXTENSION: &str = ".txt";

// Points for each label that matches the gold file
const MATCH_POINTS: f64 = 0.5;

// Candidate name to score, sorted by name
pub type Scores = BTreeMap<String, f64>;

// Labels are the trimmed non-blank lines
pub fn load_labels<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    reader
        .lines()
        .filter_map(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok(line.trim().to_string())),
            Err(e) => Some(Err(e)),
        })
        .collect()
}

fn load_label_file(path: &Path) -> Result<Vec<String>> {
    File::open(path)
        .map(BufReader::new)
        .and_then(load_labels)
        .with_context(|| format!("failed to read `{}`", path.display()))
}

/// Aligns labels by position, stopping at the shorter list.
pub fn score<S: AsRef<str>>(gold: &[S], candidate: &[S]) -> f64 {
    let matches = gold.iter()
        .zip(candidate)
        .filter(|(g, c)| AsRef::<str>::as_ref(*g) == AsRef::<str>::as_ref(*c))
        .count();
    matches as f64 * MATCH_POINTS
}

// Verdict files end in `.txt`; visualization files are skipped. Returns the
// candidate name
pub fn candidate_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(EXTENSION)
        .filter(|name| !name.ends_with(VISUALIZATION_SUFFIX))
}

pub fn score_dir(gold: &[String], pred_dir: &Path) -> Result<Scores> {
    let entries = fs::read_dir(pred_dir)
        .with_context(|| format!("failed to read `{}`", pred_dir.display()))?;

    let mut scores = Scores::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read `{}`", pred_dir.display()))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(candidate_name) else {
            debug!("skipping {:?}", file_name);
            continue;
        };

        let labels = load_label_file(&entry.path())?;
        let points = score(gold, &labels);
        debug!("{}: {} of {} labels scored {}", name, labels.len(), gold.len(), points);
        scores.insert(name.to_string(), points);
    }
    Ok(scores)
}

pub fn write_scores<W: Write>(out: &mut W, scores: &Scores) -> std::io::Result<()> {
    for (name, points) in scores {
        writeln!(out, "{} {:.1}", name, points)?;
    }
    out.flush()
}

/// Scores every verdict file in `pred_dir` against `gold_path` and writes
/// one `<name> <score>` line per candidate to `output_path`.
pub fn evaluate(gold_path: &Path, pred_dir: &Path, output_path: &Path) -> Result<Scores> {
    let gold = load_label_file(gold_path)?;
    let scores = score_dir(&gold, pred_dir)?;

    let mut out = File::create(output_path)
        .map(BufWriter::new)
        .with_context(|| format!("failed to create `{}`", output_path.display()))?;
    write_scores(&mut out, &scores)
        .with_context(|| format!("failed to write `{}`", output_path.display()))?;

    info!("scored {} candidates, results written to {}", scores.len(), output_path.display());
    Ok(scores)
}
