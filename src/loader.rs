use crate::errors::DataLoadError;
use csv::{StringRecord, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// The columns every sales file MUST name in its header row. Any other
/// columns are read past and ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Product", "Category", "Quantity", "Price"];

/// A single row exactly as it appears in the source file, with surrounding
/// whitespace trimmed. Nothing is parsed yet; that is the enricher's job.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Price")]
    pub price: String,
}

/// The in-memory table produced by the loader: every header column name in
/// file order plus the rows in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads delimited sales data into a Dataset.
#[derive(Clone, Debug)]
pub struct Loader {
    delimiter: u8,
}

impl Default for Loader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl Loader {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Loads the file located at `path`. A missing or unreadable file is
    /// reported together with the path that was tried.
    pub fn load_path(&self, path: &Path) -> Result<Dataset, DataLoadError> {
        let file = File::open(path).map_err(|err| DataLoadError::Io(path.to_path_buf(), err))?;
        let dataset = self.load_reader(file)?;

        tracing::debug!(
            path = %path.display(),
            rows = dataset.len(),
            columns = dataset.columns.len(),
            "loaded sales data"
        );
        Ok(dataset)
    }

    /// Loads sales data from any reader. The whole input is consumed; the
    /// first malformed row stops the load.
    pub fn load_reader<R: io::Read>(&self, reader: R) -> Result<Dataset, DataLoadError> {
        // Note: the csv library handles setting up an io::BufReader so we
        // don't need to do that here.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        check_required_columns(&headers)?;

        let mut records = Vec::new();
        for record in rdr.deserialize() {
            let record: RawRecord = record?;
            records.push(record);
        }

        Ok(Dataset {
            columns: headers.iter().map(String::from).collect(),
            records,
        })
    }
}

fn check_required_columns(headers: &StringRecord) -> Result<(), DataLoadError> {
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|column| column == required) {
            return Err(DataLoadError::MissingColumn(required.to_string()));
        }
    }

    Ok(())
}

impl TryFrom<PathBuf> for Dataset {
    type Error = DataLoadError;

    /// Loads the comma separated file located at the provided PathBuf.
    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Loader::default().load_path(&path)
    }
}
