//! Batch orchestration: sheet → per-patient PDFs → summary workbook.
//!
//! Records are processed sequentially in input order. A failure while
//! rendering one patient is recorded and the batch moves on; only a missing
//! input or a missing required column stops the run.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::assets::AssetResolver;
use super::classify::classify_outcome;
use super::layout::{compose_report, render_report, ReportAssets};
use super::normalize::{normalize_record, PatientFields};
use super::output::{BatchContext, OutputTarget};
use super::summary::{write_summary, SummaryRow};
use super::ReportError;
use crate::config::ReportConfig;
use crate::input::read_sheet;
use crate::models::*;

/// Result of one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Rendered {
        row: usize,
        patient: String,
        category: DiagnosisCategory,
        path: PathBuf,
    },
    Failed {
        row: usize,
        patient: String,
        id: String,
        reason: String,
    },
}

impl RecordOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// What a batch run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub context: BatchContext,
    pub output_dir: PathBuf,
    pub summary_path: PathBuf,
    pub rendered: usize,
    pub failed: usize,
    pub outcomes: Vec<RecordOutcome>,
}

pub struct BatchOrchestrator {
    config: ReportConfig,
    assets: AssetResolver,
}

impl BatchOrchestrator {
    pub fn new(config: ReportConfig) -> Self {
        let assets = AssetResolver::from_config(&config);
        Self { config, assets }
    }

    /// Read the configured worksheet from `input` and process it.
    pub fn run_file(&self, input: &Path) -> Result<BatchReport, ReportError> {
        tracing::info!(file = %input.display(), sheet = %self.config.sheet_name, "Reading input");
        let sheet = read_sheet(input, &self.config.sheet_name)?;
        self.run(&sheet)
    }

    pub fn run(&self, sheet: &Sheet) -> Result<BatchReport, ReportError> {
        self.run_on(sheet, Local::now().date_naive())
    }

    /// Process `sheet`; `today` dates batches whose first record has no exam date.
    pub fn run_on(&self, sheet: &Sheet, today: NaiveDate) -> Result<BatchReport, ReportError> {
        if let Some(column) = sheet.missing_required_column() {
            return Err(ReportError::MissingColumn(column.to_string()));
        }

        let patients: Vec<PatientRecord> = sheet
            .records
            .iter()
            .filter(|r| r.has(COL_NAME))
            .cloned()
            .collect();
        let skipped = sheet.records.len() - patients.len();
        tracing::info!(patients = patients.len(), skipped, "Patients found");

        let context = BatchContext::from_records(&patients, today);
        let output_dir = context.batch_root(self.config.output_base());
        std::fs::create_dir_all(&output_dir)?;
        tracing::info!(
            region = %context.region,
            institution = %context.institution,
            date = %context.date_tag,
            output = %output_dir.display(),
            "Batch output folder ready"
        );

        let mut outcomes = Vec::with_capacity(patients.len());
        let mut summary_rows = Vec::with_capacity(patients.len());
        let (mut rendered, mut failed) = (0usize, 0usize);

        for (idx, record) in patients.iter().enumerate() {
            let fields = normalize_record(record);
            let category = classify_outcome(fields.outcome.as_deref());
            summary_rows.push(SummaryRow::new(idx as u32 + 1, &fields, category));

            let outcome = self.process_record(record.row, &fields, category, &output_dir);
            if outcome.is_rendered() {
                rendered += 1;
            } else {
                failed += 1;
            }
            outcomes.push(outcome);
        }

        let summary_path = output_dir.join(context.summary_file_name());
        let brand_logo = self.assets.brand_logo();
        write_summary(
            &summary_path,
            &context.institution,
            &summary_rows,
            brand_logo.as_deref(),
        )?;

        tracing::info!(rendered, failed, output = %output_dir.display(), "Batch complete");

        Ok(BatchReport {
            context,
            output_dir,
            summary_path,
            rendered,
            failed,
            outcomes,
        })
    }

    fn process_record(
        &self,
        row: usize,
        fields: &PatientFields,
        category: DiagnosisCategory,
        output_dir: &Path,
    ) -> RecordOutcome {
        match self.render_record(fields, category, output_dir) {
            Ok(path) => {
                tracing::info!(
                    patient = %fields.name,
                    category = category.as_str(),
                    path = %path.display(),
                    "Report generated"
                );
                RecordOutcome::Rendered {
                    row,
                    patient: fields.name.clone(),
                    category,
                    path,
                }
            }
            Err(e) => {
                tracing::warn!(
                    patient = %fields.name,
                    rut = %fields.id,
                    row,
                    error = %e,
                    "Report generation failed"
                );
                RecordOutcome::Failed {
                    row,
                    patient: fields.name.clone(),
                    id: fields.id.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn render_record(
        &self,
        fields: &PatientFields,
        category: DiagnosisCategory,
        output_dir: &Path,
    ) -> Result<PathBuf, ReportError> {
        let target = OutputTarget::new(output_dir, category, Some(fields.name.as_str()));
        target.ensure_directory()?;

        let assets = ReportAssets::resolve(&self.assets, fields, category);
        let document = compose_report(fields, category, &assets);
        render_report(&document, &target.path)?;
        Ok(target.path)
    }
}
