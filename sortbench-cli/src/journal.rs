//! Sample Journal
//!
//! Per-size CSV files (`results_{size}.csv`) holding one row per finished
//! work unit. A run that finds existing rows treats them as already executed,
//! so an interrupted run can be resumed without repeating work.
//!
//! ```text
//! Algorithm,Array Size,Iteration,Elapsed Time (seconds)
//! Merge Sort,5,1,0.000000412
//! Slowsort,5,1,DNF
//! ```

use sortbench_core::RunOutcome;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Header line of every journal file
pub const JOURNAL_HEADER: &str = "Algorithm,Array Size,Iteration,Elapsed Time (seconds)";

const TIMED_OUT_CELL: &str = "DNF";
const ERRORED_CELL: &str = "ERR";

/// Reason attached to errored outcomes restored from a journal
pub const RESTORED_ERROR: &str = "error recorded in journal";

/// One journal line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRow {
    pub algorithm: String,
    pub size: usize,
    pub iteration: u32,
    pub outcome: RunOutcome,
}

impl JournalRow {
    fn to_line(&self) -> String {
        let elapsed = match &self.outcome {
            RunOutcome::Success(d) => format!("{}.{:09}", d.as_secs(), d.subsec_nanos()),
            RunOutcome::TimedOut => TIMED_OUT_CELL.to_string(),
            RunOutcome::Errored(_) => ERRORED_CELL.to_string(),
        };
        format!(
            "{},{},{},{}",
            quote_field(&self.algorithm),
            self.size,
            self.iteration,
            elapsed
        )
    }

    fn parse(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [algorithm, size, iteration, elapsed] = fields.as_slice() else {
            return None;
        };

        let outcome = match elapsed.trim() {
            TIMED_OUT_CELL => RunOutcome::TimedOut,
            ERRORED_CELL => RunOutcome::Errored(RESTORED_ERROR.to_string()),
            secs => RunOutcome::Success(parse_seconds(secs)?),
        };

        Some(Self {
            algorithm: algorithm.clone(),
            size: size.trim().parse().ok()?,
            iteration: iteration.trim().parse().ok()?,
            outcome,
        })
    }
}

/// Parse a decimal seconds cell without a float round-trip
fn parse_seconds(cell: &str) -> Option<Duration> {
    let (whole, frac) = cell.split_once('.').unwrap_or((cell, ""));
    if frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let secs: u64 = whole.parse().ok()?;
    let nanos: u32 = if frac.is_empty() {
        0
    } else {
        format!("{:0<9}", frac).parse().ok()?
    };
    Some(Duration::new(secs, nanos))
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => quoted = false,
            ('"', false) if current.is_empty() => quoted = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }
    if quoted {
        return None;
    }
    fields.push(current);
    Some(fields)
}

/// Directory of per-size journal files
#[derive(Debug)]
pub struct Journal {
    dir: PathBuf,
    current: Option<(usize, BufWriter<File>)>,
}

impl Journal {
    /// Open (creating if needed) the journal directory
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, current: None })
    }

    /// Directory holding the journal files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the rows of one size
    pub fn path_for(&self, size: usize) -> PathBuf {
        self.dir.join(format!("results_{}.csv", size))
    }

    /// Rows already recorded for `size`. Malformed lines are skipped with a warning.
    pub fn load(&self, size: usize) -> io::Result<Vec<JournalRow>> {
        let path = self.path_for(size);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&path)?);
        let mut rows = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line == JOURNAL_HEADER {
                continue;
            }
            match JournalRow::parse(&line) {
                Some(row) if row.size == size => rows.push(row),
                _ => warn!(
                    "Ignoring malformed journal line {} in {}",
                    number + 1,
                    path.display()
                ),
            }
        }
        Ok(rows)
    }

    /// Append one row and flush it to disk
    pub fn append(&mut self, row: &JournalRow) -> io::Result<()> {
        let writer = self.writer_for(row.size)?;
        writeln!(writer, "{}", row.to_line())?;
        writer.flush()
    }

    fn writer_for(&mut self, size: usize) -> io::Result<&mut BufWriter<File>> {
        if !matches!(self.current, Some((open, _)) if open == size) {
            let path = self.path_for(size);
            let is_new = !path.exists() || std::fs::metadata(&path)?.len() == 0;
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let mut writer = BufWriter::new(file);
            if is_new {
                writeln!(writer, "{}", JOURNAL_HEADER)?;
            }
            self.current = Some((size, writer));
        }
        match self.current.as_mut() {
            Some((_, writer)) => Ok(writer),
            None => Err(io::Error::other("journal writer unavailable")),
        }
    }

    /// Close the size's file and rewrite it sorted by (algorithm, iteration)
    pub fn finish_size(&mut self, size: usize) -> io::Result<()> {
        if let Some((open, mut writer)) = self.current.take() {
            writer.flush()?;
            if open != size {
                self.current = Some((open, writer));
            }
        }

        let mut rows = self.load(size)?;
        if rows.is_empty() {
            return Ok(());
        }
        rows.sort_by(|a, b| {
            a.algorithm
                .cmp(&b.algorithm)
                .then(a.iteration.cmp(&b.iteration))
        });
        rows.dedup_by(|a, b| a.algorithm == b.algorithm && a.iteration == b.iteration);

        let path = self.path_for(size);
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            writeln!(writer, "{}", JOURNAL_HEADER)?;
            for row in &rows {
                writeln!(writer, "{}", row.to_line())?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp, &path)
    }
}
