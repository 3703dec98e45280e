use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::extract::RecordAssembler;
use crate::fetch::{Fetcher, Source};
use crate::normalize::normalize;
use crate::record::ProductRecord;
use crate::validate::SchemaValidator;
use crate::writer::JsonWriter;

pub struct RunOptions {
    pub inputs: PathBuf,
    pub output: PathBuf,
    pub schema: PathBuf,
    pub settings: Settings,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub inputs: usize,
    pub written: usize,
    pub failed: usize,
}

/// Setup failures (input list, schema, HTTP client, output file) are
/// returned; per-input failures are logged and skipped.
pub async fn run(opts: &RunOptions) -> Result<RunSummary> {
    let started = Instant::now();
    let inputs = read_inputs(&opts.inputs)?;
    let validator = SchemaValidator::from_path(&opts.schema)
        .with_context(|| format!("Failed to load schema {}", opts.schema.display()))?;
    let fetcher = Fetcher::new(opts.settings.timeout())?;
    let pipeline = Pipeline::new(
        fetcher,
        RecordAssembler::default(),
        validator,
        opts.settings.delay(),
    );

    let records = pipeline.run_batch(&inputs).await?;

    let writer = JsonWriter::new(&opts.output);
    writer.write(&records)?;

    let summary = RunSummary {
        inputs: inputs.len(),
        written: records.len(),
        failed: inputs.len() - records.len(),
    };
    info!("{}", summary.report(writer.path(), started.elapsed()));
    Ok(summary)
}

impl RunSummary {
    /// Final line of a run: records written against inputs supplied.
    pub fn report(&self, output: &Path, elapsed: Duration) -> String {
        let mut line = format!(
            "Wrote {} of {} records -> {}",
            self.written,
            self.inputs,
            output.display()
        );
        if self.failed > 0 {
            line.push_str(&format!(" ({} skipped)", self.failed));
        }
        line.push_str(&format!(" in {}", format_elapsed(elapsed)));
        line
    }
}

fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, _) => format!("{:.1}s", d.as_secs_f64()),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, s) => format!("{h}h {m}m {s}s"),
    }
}

/// Non-blank lines not starting with `#`, trimmed.
pub fn read_inputs(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input list {}", path.display()))?;
    Ok(parse_inputs(&text))
}

fn parse_inputs(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub struct Pipeline {
    fetcher: Fetcher,
    assembler: RecordAssembler,
    validator: SchemaValidator,
    delay: Option<Duration>,
}

impl Pipeline {
    pub fn new(
        fetcher: Fetcher,
        assembler: RecordAssembler,
        validator: SchemaValidator,
        delay: Option<Duration>,
    ) -> Self {
        Self {
            fetcher,
            assembler,
            validator,
            delay,
        }
    }

    /// Process inputs in order, one at a time. Only records that pass
    /// validation are returned.
    pub async fn run_batch(&self, inputs: &[String]) -> Result<Vec<ProductRecord>> {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                .progress_chars("=> "),
        );

        let mut records = Vec::with_capacity(inputs.len());
        let mut fetched_remote = false;

        for (i, input) in inputs.iter().enumerate() {
            info!("Processing ({}/{}): {}", i + 1, inputs.len(), input);
            match self.process(input, &mut fetched_remote).await {
                Ok(record) => records.push(record),
                Err(e) => warn!("Failed to process {}: {:#}", input, e),
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(records)
    }

    /// fetch → extract → normalize → validate for one input.
    async fn process(&self, input: &str, fetched_remote: &mut bool) -> Result<ProductRecord> {
        let source = Source::resolve(input)?;
        if source.is_remote() {
            if let (true, Some(delay)) = (*fetched_remote, self.delay) {
                debug!("Sleeping {:.1}s before next request", delay.as_secs_f64());
                tokio::time::sleep(delay).await;
            }
            *fetched_remote = true;
        }

        let html = self.fetcher.fetch(&source).await?;
        let raw = self.assembler.assemble_html(&html, input)?;
        let record = normalize(raw);
        self.validator
            .validate(&record)
            .context("record failed schema validation")?;

        debug!(
            "Extracted {}",
            record
                .get("product_name")
                .and_then(|v| v.as_str())
                .unwrap_or("<unnamed product>")
        );
        Ok(record)
    }
}
