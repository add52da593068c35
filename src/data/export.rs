use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::OrderTable;

/// Canonical export header, matching `OrderRecord`'s field order.
const EXPORT_HEADER: [&str; 10] = [
    "OrderID",
    "OrderDate",
    "ShipDate",
    "Region",
    "Segment",
    "Category",
    "SubCategory",
    "CustomerName",
    "Sales",
    "Profit",
];

/// Write the filtered subset as UTF-8 CSV: header row plus one row per
/// retained record, in subset order. Unknown dates serialize as empty
/// fields, so a re-load through the loader reproduces the subset.
pub fn write_subset<W: Write>(table: &OrderTable, indices: &[usize], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written explicitly so an empty subset still yields a header row.
    wtr.write_record(EXPORT_HEADER).context("writing csv header")?;
    for &i in indices {
        wtr.serialize(&table.records[i])
            .context("serializing record")?;
    }
    wtr.flush().context("flushing csv output")?;
    Ok(())
}

/// Export the subset to a file, used by the Save dialog.
pub fn export_csv(table: &OrderTable, indices: &[usize], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_subset(table, indices, file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
