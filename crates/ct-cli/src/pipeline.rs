use std::path::{Path, PathBuf};
use std::time::Duration;

use ct_core::core::{flatten_themes_json, ThemeFailure, ThemeResult, TokenBucket};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::extractor::ThemeExtractor;
use crate::report;
use crate::table::{check_writable, read_table, write_table, Table, TableError};

/// Column names the pipeline reads and writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub required_columns: Vec<String>,
    pub comment_column: String,
    pub themes_json_column: String,
    pub themes_flat_column: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("missing expected columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub rows: usize,
    pub service_calls: usize,
    pub blank_comments: usize,
    /// Rows whose themes are a failure sentinel other than `no_comment`.
    pub fallbacks: usize,
}

// ---------------------------------------------------------------------------
// ThemeEnrichmentPipeline
// ---------------------------------------------------------------------------

pub struct ThemeEnrichmentPipeline {
    extractor: ThemeExtractor,
    pacer: TokenBucket,
    epoch: Instant,
    layout: SheetLayout,
}

impl ThemeEnrichmentPipeline {
    pub fn new(extractor: ThemeExtractor, pacer: TokenBucket, layout: SheetLayout) -> Self {
        Self {
            extractor,
            pacer,
            epoch: Instant::now(),
            layout,
        }
    }

    /// Theme every row of `input` and write the enriched table to `output`.
    ///
    /// Missing input, unknown formats and missing columns fail before any
    /// service call. After that every row gets a theme value.
    pub async fn run(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<EnrichmentSummary, PipelineError> {
        let span = tracing::info_span!("themes_run", run_id = %Uuid::new_v4());
        self.run_inner(input, output).instrument(span).await
    }

    async fn run_inner(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<EnrichmentSummary, PipelineError> {
        if !input.is_file() {
            return Err(PipelineError::InputNotFound(input.to_path_buf()));
        }
        check_writable(output)?;

        let mut table = read_table(input)?;
        tracing::info!(input = %input.display(), rows = table.row_count(), "table loaded");
        report::table_loaded(input, table.row_count());

        let missing = table.missing_columns(&self.layout.required_columns);
        if !missing.is_empty() {
            return Err(PipelineError::MissingColumns(missing));
        }
        let comment_index = table
            .column_index(&self.layout.comment_column)
            .ok_or_else(|| PipelineError::MissingColumns(vec![self.layout.comment_column.clone()]))?;

        let (results, summary) = self.theme_rows(&table, comment_index).await;

        let themes_json: Vec<String> = results.iter().map(ThemeResult::to_json).collect();
        let themes_flat: Vec<String> = themes_json
            .iter()
            .map(|json| flatten_themes_json(json))
            .collect();
        table.set_column(&self.layout.themes_json_column, themes_json)?;
        table.set_column(&self.layout.themes_flat_column, themes_flat)?;

        report::saving(output);
        write_table(output, &table)?;
        tracing::info!(
            output = %output.display(),
            rows = summary.rows,
            service_calls = summary.service_calls,
            fallbacks = summary.fallbacks,
            "enriched table written"
        );
        Ok(summary)
    }

    async fn theme_rows(
        &mut self,
        table: &Table,
        comment_index: usize,
    ) -> (Vec<ThemeResult>, EnrichmentSummary) {
        let total = table.row_count();
        let mut results = Vec::with_capacity(total);
        let mut summary = EnrichmentSummary {
            rows: total,
            ..EnrichmentSummary::default()
        };

        for row in 0..total {
            report::row_started(row + 1, total);
            let cell = table.cell(row, comment_index);

            if cell.is_blank() {
                report::row_skipped();
                summary.blank_comments += 1;
                results.push(ThemeResult::from_failure(ThemeFailure::NoComment));
                continue;
            }

            self.wait_for_slot().await;
            let comment = cell.to_string();
            let result = self.extractor.extract(comment.trim()).await;
            summary.service_calls += 1;
            if result.failure().is_some() {
                summary.fallbacks += 1;
            }
            report::row_finished(&result);
            results.push(result);
        }

        (results, summary)
    }

    async fn wait_for_slot(&mut self) {
        loop {
            let now_ms = self.epoch.elapsed().as_millis() as u64;
            match self.pacer.try_acquire(now_ms) {
                Ok(()) => return,
                Err(delay) => {
                    tracing::debug!(wait_ms = delay.wait_ms, "pacing service calls");
                    tokio::time::sleep(Duration::from_millis(delay.wait_ms)).await;
                }
            }
        }
    }
}
