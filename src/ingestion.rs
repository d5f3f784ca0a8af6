use crate::error::{LedgerError, Result};
use crate::schema::{CellValue, LedgerRow, LoadOptions, REQUIRED_COLUMNS};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::{debug, info};
use std::io::{Cursor, Read};

/// Ledger rows restricted to the required columns, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerTable {
    pub rows: Vec<LedgerRow>,
}

impl LedgerTable {
    pub fn new(rows: Vec<LedgerRow>) -> Self {
        Self { rows }
    }

    /// Selects the required columns from a header row and its data records.
    ///
    /// Fails when any required column is absent. Individual cells are not
    /// validated; short records are padded with empty cells and records
    /// with no values at all are skipped.
    pub fn from_records<I>(headers: &[String], records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<CellValue>>,
    {
        let mut missing = Vec::new();
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];

        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|header| header == name) {
                Some(index) => positions[slot] = index,
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(LedgerError::MissingColumns(missing));
        }

        let mut rows = Vec::new();
        let mut blank = 0usize;

        for record in records {
            if record.iter().all(CellValue::is_empty) {
                blank += 1;
                continue;
            }
            rows.push(select_row(&record, &positions));
        }

        debug!("Selected {} ledger rows ({} blank rows skipped)", rows.len(), blank);

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn select_row(record: &[CellValue], positions: &[usize; REQUIRED_COLUMNS.len()]) -> LedgerRow {
    let cell = |slot: usize| record.get(positions[slot]).cloned().unwrap_or_default();
    let text = |slot: usize| cell(slot).to_string();

    LedgerRow {
        uniq_id: text(0),
        id: text(1),
        company_code: text(2),
        document_date: cell(3),
        document_number: text(4),
        description: text(5),
        debit_account: text(6),
        credit_account: text(7),
        amount: cell(8),
        partner_code: text(9),
        partner_name: text(10),
        business_code: text(11),
        material_code: text(12),
        material_short_name: text(13),
        material_name: text(14),
        item_code: text(15),
        item_name: text(16),
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(text) => CellValue::from_text(text),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => value
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(value.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
    }
}

/// Decodes an xlsx/xls/xlsb/ods payload and loads the ledger from the
/// configured worksheet, treating its first row as the header.
pub fn load_workbook(bytes: &[u8], options: &LoadOptions) -> Result<LedgerTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet_names = workbook.sheet_names();
    let sheet = match &options.sheet_name {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| *candidate == name)
            .cloned()
            .ok_or_else(|| LedgerError::SheetNotFound(name.clone()))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or(LedgerError::EmptyWorkbook)?,
    };

    info!("Loading ledger from worksheet '{}'", sheet);

    let range = workbook.worksheet_range(&sheet)?;
    let mut grid = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());

    let headers: Vec<String> = grid
        .next()
        .map(|row| row.iter().map(CellValue::to_string).collect())
        .unwrap_or_default();

    LedgerTable::from_records(&headers, grid)
}

/// Loads a ledger from CSV text with a header row. Every field is read as
/// text; empty fields become empty cells. Invalid UTF-8 inside a field is
/// replaced rather than failing the load.
pub fn load_csv<R: Read>(reader: R) -> Result<LedgerTable> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();

    let mut records = Vec::new();
    for record in rdr.byte_records() {
        let record = record?;
        records.push(
            record
                .iter()
                .map(|field| CellValue::from_text(&String::from_utf8_lossy(field)))
                .collect::<Vec<_>>(),
        );
    }

    info!("Loaded {} CSV records", records.len());

    LedgerTable::from_records(&headers, records)
}
