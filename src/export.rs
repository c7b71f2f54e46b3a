//! CSV interchange between the scrape and the ingest

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::models::ProductRecord;

pub const HEADER: [&str; 8] = [
    "Title",
    "Status",
    "Price",
    "Wishlist",
    "Character",
    "Series",
    "Category",
    "Manufacturer",
];

/// Writes the header followed by one row per record; absent values become empty fields.
///
/// The header is written even when there are no records.
pub fn write_records<W: Write>(writer: W, records: &[ProductRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads records back; empty fields become absent values.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ProductRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr.deserialize().collect::<Result<Vec<ProductRecord>, _>>()?;
    Ok(records)
}

pub fn save(path: &Path, records: &[ProductRecord]) -> Result<()> {
    write_records(File::create(path)?, records)?;
    info!("Details saved to {}", path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<ProductRecord>> {
    read_records(File::open(path)?)
}
