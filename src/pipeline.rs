//! Stage orchestration: load, enrich, aggregate and narrate. Each stage gets
//! its input passed in and hands back a new value, so any stage can be run
//! on its own.

use crate::aggregator::{aggregate, Aggregates};
use crate::enricher::{enrich, EnrichedDataset, MissingValuePolicy};
use crate::errors::{DataFormatError, DataLoadError};
use crate::loader::{Dataset, Loader};
use crate::profile::DatasetProfile;
use crate::report::{Report, ReportOptions};
use std::error::Error;
use std::fmt;
use std::fmt::Formatter;
use std::path::PathBuf;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_OUTPUT_DIR: &str = "charts";

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub delimiter: u8,
    pub missing_values: MissingValuePolicy,
    pub focus_categories: Vec<String>,
    pub preview_rows: usize,
    pub render_charts: bool,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delimiter: b',',
            missing_values: MissingValuePolicy::default(),
            focus_categories: Vec::new(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            render_charts: true,
        }
    }
}

/// Everything the binary prints or draws, produced by one pipeline run.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub profile: DatasetProfile,
    pub enriched: EnrichedDataset,
    pub aggregates: Aggregates,
    pub report: Report,
}

/// Failures that stop the pipeline before any output is produced.
#[derive(Debug)]
pub enum PipelineError {
    Load(DataLoadError),
    Format(DataFormatError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Load(err) => write!(f, "failed to load sales data: {}", err),
            PipelineError::Format(err) => write!(f, "failed to prepare sales data: {}", err),
        }
    }
}

impl From<DataLoadError> for PipelineError {
    fn from(err: DataLoadError) -> Self {
        PipelineError::Load(err)
    }
}

impl From<DataFormatError> for PipelineError {
    fn from(err: DataFormatError) -> Self {
        PipelineError::Format(err)
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Load(err) => Some(err),
            PipelineError::Format(err) => Some(err),
        }
    }
}

/// Loads the configured input file and analyzes it.
pub fn run(config: &PipelineConfig) -> Result<Analysis, PipelineError> {
    let dataset = Loader::with_delimiter(config.delimiter).load_path(&config.input)?;
    Ok(analyze(&dataset, config)?)
}

/// Runs every stage after loading. Enrichment errors abort before any
/// aggregate is computed.
pub fn analyze(dataset: &Dataset, config: &PipelineConfig) -> Result<Analysis, DataFormatError> {
    let profile = DatasetProfile::new(dataset, config.preview_rows);
    let enriched = enrich(dataset, config.missing_values)?;
    let aggregates = aggregate(&enriched.records);
    let report = Report::build(
        &aggregates,
        enriched.missing,
        &ReportOptions {
            focus_categories: config.focus_categories.clone(),
        },
    );

    tracing::info!(
        records = enriched.len(),
        categories = aggregates.category_revenue.len(),
        products = aggregates.product_revenue.len(),
        "analysis complete"
    );

    Ok(Analysis {
        profile,
        enriched,
        aggregates,
        report,
    })
}
