use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::domain::transaction::{AMOUNT, FRAUD_LABEL, FRAUD_LABEL_ALIAS, RAIL, TX_ID};
use crate::domain::Transaction;
use crate::error::{SchemaError, TableError};

/// Read a transactions CSV file.
pub fn read_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>, TableError> {
    let file = File::open(path)?;
    read_transactions_from(BufReader::new(file))
}

/// Read transactions from CSV with a header row.
///
/// Required columns are `tx_id`, `rail`, `amount` and `is_fraud_pattern`
/// (or `is_fraud`). Every other column is a risk attribute; empty cells are
/// treated as absent. The first structural problem aborts the read.
pub fn read_transactions_from<R: Read>(reader: R) -> Result<Vec<Transaction>, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    for column in [TX_ID, RAIL, AMOUNT] {
        if !headers.iter().any(|h| h == column) {
            return Err(SchemaError::MissingColumn(column).into());
        }
    }
    if !headers
        .iter()
        .any(|h| h == FRAUD_LABEL || h == FRAUD_LABEL_ALIAS)
    {
        return Err(SchemaError::MissingColumn(FRAUD_LABEL).into());
    }

    let mut transactions = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let tx = Transaction::from_row(i + 1, headers.iter().zip(record.iter()))?;
        transactions.push(tx);
    }

    Ok(transactions)
}
