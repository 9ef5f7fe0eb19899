//! The export pipeline

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::header::HeaderList;
use crate::locate::locate_sheets;
use crate::populate::populate_rows;
use crate::record::{parse_records, InputRecord};
use crate::respond::{ExportResponse, WorkbookEncoder, XlsxEncoder};
use crate::strategy::{StrategyContext, TemplateStrategy};
use crate::template::{TemplateFile, TemplateSource};

/// Fills the configured template with records
///
/// Holds only immutable configuration and the resolved template source, so
/// one `Exporter` can serve concurrent callers; every call loads its own
/// copy of the template.
pub struct Exporter {
    config: ExportConfig,
    source: Box<dyn TemplateSource>,
    strategy: Box<dyn TemplateStrategy>,
    encoder: Box<dyn WorkbookEncoder>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("template", &self.source.describe())
            .field("strategy", &self.strategy.name())
            .field("data_sheet", &self.config.data_sheet)
            .finish()
    }
}

impl Exporter {
    /// Validate `config` and resolve its template path
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        let source = TemplateFile::open(&config.template_path)?;
        log::debug!(
            "exporter ready: template '{}', strategy {}",
            source.path().display(),
            config.strategy
        );
        Ok(Self::with_parts(config, Box::new(source), Box::new(XlsxEncoder)))
    }

    /// Assemble from explicit parts; the strategy comes from `config`
    pub fn with_parts(
        config: ExportConfig,
        source: Box<dyn TemplateSource>,
        encoder: Box<dyn WorkbookEncoder>,
    ) -> Self {
        let strategy = config.strategy.build();
        Self {
            config,
            source,
            strategy,
            encoder,
        }
    }

    /// Replace the strategy chosen by the config
    pub fn with_strategy(mut self, strategy: Box<dyn TemplateStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run the whole pipeline for `records`
    ///
    /// Load, locate sheets, read headers, populate rows, finish through the
    /// strategy, encode. The response exists only once every stage has
    /// succeeded.
    pub fn export(&self, records: &[InputRecord]) -> Result<ExportResponse> {
        if records.is_empty() {
            return Err(ExportError::invalid_input(
                "payload must contain at least one record",
            ));
        }

        let mut workbook = self.source.load()?;
        log::debug!(
            "loaded template {} ({} sheet(s))",
            self.source.describe(),
            workbook.sheet_count()
        );

        let found = locate_sheets(&workbook, &self.config.required_sheets())?;
        let sheet = found
            .first()
            .and_then(|&index| workbook.worksheet_mut(index))
            .ok_or_else(|| ExportError::SheetNotFound {
                missing: vec![self.config.data_sheet.clone()],
            })?;

        let headers = HeaderList::from_sheet(sheet);
        log::debug!("{} header(s) in '{}'", headers.len(), sheet.name());

        let written = populate_rows(sheet, records, &headers)?;

        let ctx = StrategyContext::new(&self.config, written);
        let workbook = self.strategy.finish(workbook, &ctx)?;

        ExportResponse::build(
            &workbook,
            self.encoder.as_ref(),
            &self.config.download_filename,
        )
    }

    /// Parse a JSON array request body and export it
    pub fn export_json(&self, body: &[u8]) -> Result<ExportResponse> {
        let records = parse_records(body)?;
        self.export(&records)
    }
}
