use crate::output::write_json_lines;
use crate::{DatasetError, DatasetPaths, ProcessedRecord, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{error, info, warn};

/// The `Transformer` struct turns scraped wiki pages into instruction-tuning records.
pub struct Transformer {
    progress: ProgressBar,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer {
    /// Creates a `Transformer` that reports no progress.
    pub fn new() -> Self {
        Self {
            progress: ProgressBar::hidden(),
        }
    }

    /// Advances `progress` once per raw entry.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Reshapes raw entries into processed records, keeping their order.
    ///
    /// Entries with blank content or missing keys are logged and skipped.
    pub fn transform(&self, entries: &[Value]) -> Vec<ProcessedRecord> {
        self.progress.set_length(entries.len() as u64);

        let mut processed = Vec::with_capacity(entries.len());
        for entry in entries {
            match process_entry(entry) {
                Ok(Some(record)) => processed.push(record),
                Ok(None) => {}
                Err(e) => error!("Skipping entry {}: {}", entry_title(entry), e),
            }
            self.progress.inc(1);
        }

        processed
    }

    /// Reads the raw JSON array at `input` and writes the records to `output` as JSON lines.
    ///
    /// # Arguments
    ///
    /// * `input` - The raw store written by the scraper.
    /// * `output` - The JSONL file to create; its parent directory must exist.
    ///
    /// # Returns
    ///
    /// The number of records written, or an error if `input` is missing or unreadable.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<usize> {
        if !input.exists() {
            return Err(DatasetError::InputNotFound(input.to_path_buf()));
        }

        let reader = BufReader::new(File::open(input)?);
        let entries: Vec<Value> = serde_json::from_reader(reader)?;
        info!("Processing {} entries", entries.len());

        let processed = self.transform(&entries);
        write_json_lines(output, &processed)?;

        self.progress.finish_and_clear();
        info!(
            "Successfully processed {} entries into {}",
            processed.len(),
            output.display()
        );

        Ok(processed.len())
    }
}

/// Builds the record for one raw entry.
///
/// Returns `Ok(None)` when the content is blank after trimming.
fn process_entry(entry: &Value) -> Result<Option<ProcessedRecord>> {
    let content = string_field(entry, "content")?.trim();
    let title = string_field(entry, "title")?;

    if content.is_empty() {
        warn!("Empty content for entry: {}", title);
        return Ok(None);
    }

    Ok(Some(ProcessedRecord::for_command(title, content)))
}

fn string_field<'a>(entry: &'a Value, key: &'static str) -> Result<&'a str> {
    match entry.get(key) {
        None => Err(DatasetError::MissingField(key)),
        Some(value) => value.as_str().ok_or(DatasetError::InvalidField(key)),
    }
}

fn entry_title(entry: &Value) -> &str {
    entry.get("title").and_then(Value::as_str).unwrap_or("unknown")
}

/// Runs the sorter over the standard dataset layout.
///
/// Any error is logged as fatal and returned.
pub fn process_wiki_data(paths: &DatasetPaths) -> Result<usize> {
    match run_sort(paths) {
        Ok(count) => Ok(count),
        Err(e) => {
            error!("Fatal error during processing: {}", e);
            Err(e)
        }
    }
}

fn run_sort(paths: &DatasetPaths) -> Result<usize> {
    let input = paths.raw_file();
    if !input.exists() {
        return Err(DatasetError::InputNotFound(input));
    }
    std::fs::create_dir_all(&paths.processed_dir)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Processing entries [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    Transformer::new()
        .with_progress(progress)
        .process_file(&input, &paths.processed_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trims_content_and_builds_instruction() {
        let entries = vec![json!({"title": "T", "url": "U", "content": "  hello  "})];

        let records = Transformer::new().transform(&entries);

        assert_eq!(
            records,
            vec![ProcessedRecord {
                instruction: "Explain the Arma command: T".to_string(),
                input: String::new(),
                output: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn test_whitespace_content_is_skipped() {
        let entries = vec![json!({"title": "T", "url": "U", "content": "   "})];

        assert!(Transformer::new().transform(&entries).is_empty());
    }

    #[test]
    fn test_whitespace_content_logs_warning() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![json!({"title": "blankCommand", "url": "U", "content": " \n\t "})];

        let log_path = {
            let session = crate::logging::LogSession::start(dir.path(), "sorter").unwrap();
            assert!(Transformer::new().transform(&entries).is_empty());
            session.path().to_path_buf()
        };

        let text = std::fs::read_to_string(log_path).unwrap();
        assert!(text.contains("WARN"));
        assert!(text.contains("Empty content for entry: blankCommand"));
    }

    #[test]
    fn test_malformed_entries_do_not_abort_batch() {
        let entries = vec![
            json!({"title": "missing content", "url": "U"}),
            json!({"url": "U", "content": "no title"}),
            json!({"title": "numeric", "content": 42}),
            json!("not an object"),
            json!({"title": "hint", "content": "Shows a hint."}),
        ];

        let records = Transformer::new().transform(&entries);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].instruction, "Explain the Arma command: hint");
    }

    #[test]
    fn test_url_is_not_required() {
        let entry = json!({"title": "hint", "content": "Shows a hint."});

        assert!(process_entry(&entry).unwrap().is_some());
    }

    #[test]
    fn test_missing_field_reports_key() {
        let entry = json!({"title": "hint"});

        assert!(matches!(
            process_entry(&entry),
            Err(DatasetError::MissingField("content"))
        ));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = Transformer::new().process_file(
            &dir.path().join("raw_wiki_data.json"),
            &dir.path().join("out.jsonl"),
        );

        assert!(matches!(result, Err(DatasetError::InputNotFound(_))));
        assert!(!dir.path().join("out.jsonl").exists());
    }
}
