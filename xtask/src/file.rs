use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use linebuf::{ByteRange, FileWrapper, ProgressFn};

#[derive(Debug, clap::Subcommand)]
pub enum EditOp {
    /// Insert an empty line before LINE (LINE == line count appends)
    Insert { line: u32 },
    /// Delete LINE including its terminator
    Delete { line: u32 },
    /// Replace the text of LINE, keeping its terminator
    Replace { line: u32, text: String },
}

fn progress() -> ProgressFn {
    Box::new(|done: u32, total: u32| {
        tracing::debug!(done, total, "progress");
    })
}

fn open(path: &Path, create: bool) -> Result<FileWrapper> {
    let start = Instant::now();
    let w = FileWrapper::open(path, create, Some(progress()))
        .with_context(|| format!("Failed to open {}", path.display()))?;
    tracing::info!(
        lines = w.line_count(),
        bytes = w.size(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "indexed {}",
        path.display()
    );
    Ok(w)
}

pub fn lines(path: &Path, from: u32, count: Option<u32>) -> Result<()> {
    let mut w = open(path, false)?;
    let end = count.map_or(w.line_count(), |c| from.saturating_add(c).min(w.line_count()));
    if from >= w.line_count() {
        anyhow::bail!("line {from} out of range ({} lines)", w.line_count());
    }

    let width = end.to_string().len();
    for line in from..end {
        let len = w.line_length(line);
        let text = w
            .get_text(line, 0, len)
            .with_context(|| format!("line {line} vanished while reading"))?;
        println!(
            "{} {}",
            format!("{line:>width$}").dimmed(),
            text.trim_end_matches(['\r', '\n'])
        );
    }
    Ok(())
}

pub fn edit(path: &Path, op: EditOp) -> Result<()> {
    let mut w = open(path, true)?;
    let before = (w.line_count(), w.size());

    match op {
        EditOp::Insert { line } => w
            .insert_line(line)
            .with_context(|| format!("Failed to insert line {line}"))?,
        EditOp::Delete { line } => w
            .delete_line(line)
            .with_context(|| format!("Failed to delete line {line}"))?,
        EditOp::Replace { line, text } => {
            let range = content_range(&mut w, line)
                .with_context(|| format!("line {line} out of range ({} lines)", w.line_count()))?;
            w.replace_range(range, text.as_bytes())
                .with_context(|| format!("Failed to replace line {line}"))?;
        }
    }

    println!(
        "{}",
        format!(
            "✓ {}: {} → {} lines, {} → {} bytes",
            path.display(),
            before.0,
            w.line_count(),
            before.1,
            w.size()
        )
        .green()
    );
    Ok(())
}

/// Byte range of `line` without its `\n` terminator.
fn content_range(w: &mut FileWrapper, line: u32) -> Option<ByteRange> {
    let range = w.line_range(line)?;
    let end = range.end.min(w.size());
    let last = end.checked_sub(1).filter(|&at| at >= range.start);
    let terminated = last
        .and_then(|at| w.get_text(line, at.saturating_sub(range.start), 1))
        .is_some_and(|t| t == "\n");
    Some(ByteRange::new(
        range.start,
        if terminated { end.saturating_sub(1) } else { end },
    ))
}
