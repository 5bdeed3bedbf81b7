use std::error::Error;
use std::fmt;
use std::fmt::Formatter;
use std::io;
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;

/// Errors raised while reading the input file into a Dataset. Any of these
/// aborts the run before enrichment.
#[derive(Debug)]
pub enum DataLoadError {
    Io(PathBuf, io::Error),
    Csv(csv::Error),
    MissingColumn(String),
}

/// Errors raised while parsing the raw fields of a record. `row` is the
/// 1-based data row (the header is not counted).
#[derive(Debug, PartialEq)]
pub enum DataFormatError {
    InvalidDate { row: usize, value: String },
    InvalidNumber { row: usize, column: &'static str, value: String },
    NegativeValue { row: usize, column: &'static str, value: String },
    MissingValue { row: usize, column: &'static str },
}

/// A narrative line referenced a key that the aggregates do not contain.
#[derive(Debug, PartialEq)]
pub enum MissingKeyError {
    Category(String),
    Product(String),
}

#[derive(Debug)]
pub enum RenderError {
    Io(PathBuf, io::Error),
    Drawing(String),
}

impl fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataLoadError::Io(path, err) => {
                write!(f, "unable to read {}: {}", path.display(), err)
            }
            DataLoadError::Csv(err) => write!(f, "malformed sales data: {}", err),
            DataLoadError::MissingColumn(column) => {
                write!(f, "sales data is missing required column {:?}", column)
            }
        }
    }
}

impl fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataFormatError::InvalidDate { row, value } => {
                write!(f, "row {}: unable to parse date {:?}", row, value)
            }
            DataFormatError::InvalidNumber { row, column, value } => write!(
                f,
                "row {}: {} MUST be numeric, but found {:?}",
                row, column, value
            ),
            DataFormatError::NegativeValue { row, column, value } => write!(
                f,
                "row {}: {} MUST NOT be negative, but found {}",
                row, column, value
            ),
            DataFormatError::MissingValue { row, column } => {
                write!(f, "row {}: {} is missing", row, column)
            }
        }
    }
}

impl fmt::Display for MissingKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MissingKeyError::Category(name) => {
                write!(f, "category {:?} is not present in the data", name)
            }
            MissingKeyError::Product(name) => {
                write!(f, "product {:?} is not present in the data", name)
            }
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Io(path, err) => {
                write!(f, "unable to prepare {}: {}", path.display(), err)
            }
            RenderError::Drawing(msg) => write!(f, "failed to draw chart: {}", msg),
        }
    }
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        DataLoadError::Csv(err)
    }
}

impl<E: Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

impl Error for DataLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataLoadError::Io(_, err) => Some(err),
            DataLoadError::Csv(err) => Some(err),
            DataLoadError::MissingColumn(_) => None,
        }
    }
}

impl Error for DataFormatError {}
impl Error for MissingKeyError {}
impl Error for RenderError {}
