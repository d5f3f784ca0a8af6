use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Could not decode spreadsheet payload: {0}")]
    Workbook(String),

    #[error("Worksheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,

    #[error("Net profit mismatch for {month}: expected {expected}, found {actual}")]
    NetProfitMismatch {
        month: String,
        expected: f64,
        actual: f64,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LedgerError {
    /// True when the input table lacked one of the required columns.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, LedgerError::MissingColumns(_))
    }
}

impl From<calamine::Error> for LedgerError {
    fn from(err: calamine::Error) -> Self {
        LedgerError::Workbook(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
