use crate::{RunRecord, SUMMARY_COLUMNS, SummaryRow};
use anyhow::{Context, bail};
use std::{
    io::{Read, Write},
    path::Path,
};

/// Summary rows sorted by label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Project records onto the summary columns and sort by label
    ///
    /// The sort is stable, runs sharing a label keep their input order.
    pub fn from_records(records: &[RunRecord]) -> SummaryTable {
        let mut rows: Vec<SummaryRow> = records.iter().map(SummaryRow::from).collect();
        rows.sort_by(|left, right| left.label.cmp(&right.label));
        SummaryTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write header and rows, returning the number of rows written
    pub fn write_to<W: Write>(&self, writer: W) -> anyhow::Result<usize> {
        // explicit header, an empty table still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(SUMMARY_COLUMNS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(self.rows.len())
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        self.write_to(file)
            .with_context(|| format!("Unable to write {}", path.display()))
    }

    pub fn read_from<R: Read>(reader: R) -> anyhow::Result<SummaryTable> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?;
        if headers.iter().ne(SUMMARY_COLUMNS) {
            bail!("Unexpected summary columns: {:?}", headers);
        }
        let mut rows = vec![];
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(SummaryTable { rows })
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<SummaryTable> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Unable to open {}", path.display()))?;
        SummaryTable::read_from(file).with_context(|| format!("Unable to parse {}", path.display()))
    }
}
