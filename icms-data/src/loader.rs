use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use icms_core::locale::{parse_amount, parse_or_zero};
use icms_core::{
    InterstateRates, OperationInput, OperationOutcome, Purpose, RateTable, Uf, evaluate_operation,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a batch of operations.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `row` is 1-based (header = row 0).
    #[error("unrecognised purpose '{value}' on row {row}")]
    InvalidPurpose { value: String, row: usize },

    #[error("unrecognised state '{value}' on row {row}")]
    InvalidState { value: String, row: usize },
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        BatchError::CsvParse(err.to_string())
    }
}

/// A single row of the operations CSV file.
///
/// Numeric cells are kept as written (pt-BR format, e.g. `1.234,56`) and
/// are parsed when the row is evaluated; an unparseable cell counts as zero.
/// Empty `inter_rate` and `dest_rate` cells are filled from the rate table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OperationRecord {
    pub item: String,
    pub goods: String,
    #[serde(default)]
    pub freight: String,
    #[serde(default)]
    pub other_expenses: String,
    #[serde(default)]
    pub ipi: String,
    pub purpose: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub inter_rate: String,
    #[serde(default)]
    pub dest_rate: String,
    #[serde(default)]
    pub reduction: String,
    #[serde(default)]
    pub imported: String,
}

/// An evaluated row.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLine {
    /// 1-based row number (header = row 0).
    pub row: usize,
    pub item: String,
    pub origin: Uf,
    pub destination: Uf,
    pub input: OperationInput,
    pub outcome: OperationOutcome,
}

/// Sum of the amounts due over every line that produced one.
///
/// `None` when the sum does not fit in a [`Decimal`].
pub fn total_amount_due(lines: &[BatchLine]) -> Option<Decimal> {
    lines
        .iter()
        .filter_map(|line| line.outcome.amount_due())
        .try_fold(Decimal::ZERO, Decimal::checked_add)
}

fn is_yes(cell: &str) -> bool {
    matches!(
        cell.trim().to_lowercase().as_str(),
        "sim" | "s" | "yes" | "y" | "true" | "1" | "x"
    )
}

/// Loader for interstate operations from semicolon-separated CSV files.
///
/// Semicolons keep pt-BR decimal commas unquoted, matching what spreadsheet
/// software exports under a Brazilian locale.
pub struct OperationLoader;

impl OperationLoader {
    /// Parse operation records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<OperationRecord>, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: OperationRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed operation records");
        Ok(records)
    }

    /// Read and parse the CSV file at `path`.
    pub fn load_from_file(path: &Path) -> Result<Vec<OperationRecord>, BatchError> {
        let file = File::open(path).map_err(|source| BatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loading operations");
        Self::parse(file)
    }

    /// Evaluate every record against the engine.
    ///
    /// Stops at the first row whose purpose or state codes are not
    /// recognised; numeric problems never stop the batch.
    pub fn evaluate(
        records: &[OperationRecord],
        table: &RateTable,
    ) -> Result<Vec<BatchLine>, BatchError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| Self::evaluate_record(record, index + 1, table))
            .collect()
    }

    fn evaluate_record(
        record: &OperationRecord,
        row: usize,
        table: &RateTable,
    ) -> Result<BatchLine, BatchError> {
        let purpose = Purpose::parse(&record.purpose).ok_or_else(|| BatchError::InvalidPurpose {
            value: record.purpose.clone(),
            row,
        })?;
        let origin = parse_state(&record.origin, row)?;
        let destination = parse_state(&record.destination, row)?;

        let inter_rate = if record.inter_rate.is_empty() {
            table.interstate_rate(origin, destination, is_yes(&record.imported))
        } else {
            parse_or_zero(&record.inter_rate)
        };
        let dest_rate = if record.dest_rate.is_empty() {
            table.rate(destination)
        } else {
            parse_or_zero(&record.dest_rate)
        };

        let input = OperationInput {
            goods: parse_amount(&record.goods),
            freight: parse_amount(&record.freight),
            other_expenses: parse_amount(&record.other_expenses),
            excise: parse_amount(&record.ipi),
            purpose,
            rates: InterstateRates {
                inter_rate,
                dest_rate,
                reduction_pct: parse_or_zero(&record.reduction),
            },
        };
        let outcome = evaluate_operation(&input);

        debug!(row, item = %record.item, amount_due = ?outcome.amount_due(), "evaluated operation");
        Ok(BatchLine {
            row,
            item: record.item.clone(),
            origin,
            destination,
            input,
            outcome,
        })
    }
}

fn parse_state(
    value: &str,
    row: usize,
) -> Result<Uf, BatchError> {
    Uf::parse(value).ok_or_else(|| BatchError::InvalidState {
        value: value.to_string(),
        row,
    })
}
