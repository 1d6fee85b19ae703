use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::config::types::ExportFormat;
use crate::domain::criteria::SearchCriteria;
use crate::domain::table::ResultTable;
use crate::error::Result;

const COLUMNS: [&str; 9] = [
    "hotelName",
    "price",
    "reviewScore",
    "pricePerReview",
    "checkIn",
    "checkOut",
    "asOf",
    "city",
    "accommodationType",
];

/// `{city}_hotel_data_{check_in}_to_{check_out}.{ext}`, with characters that
/// would escape the output directory replaced.
pub fn export_file_name(criteria: &SearchCriteria, format: ExportFormat) -> String {
    let city: String = criteria
        .normalized_city()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    format!(
        "{city}_hotel_data_{}_to_{}.{}",
        criteria.check_in,
        criteria.check_out,
        format.extension()
    )
}

/// Write records best value first, one header row with the record columns.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in table.ranked() {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// A single-sheet workbook holding the records best value first, under a
/// bold header row.
pub fn write_xlsx(table: &ResultTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Hotels")?;

    let bold = Format::new().set_bold();
    for (col, name) in (0_u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, name, &bold)?;
    }

    for (row, record) in (1_u32..).zip(table.ranked()) {
        sheet.write_string(row, 0, &record.hotel_name)?;
        sheet.write_number(row, 1, record.price)?;
        sheet.write_number(row, 2, record.review_score)?;
        sheet.write_number(row, 3, record.price_per_review)?;
        sheet.write_string(row, 4, record.check_in.to_string())?;
        sheet.write_string(row, 5, record.check_out.to_string())?;
        sheet.write_string(row, 6, record.as_of.to_rfc3339())?;
        sheet.write_string(row, 7, &record.city)?;
        if let Some(kind) = record.accommodation_type {
            sheet.write_string(row, 8, kind.label())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write `table` under `dir`, creating it if needed. Returns the file path.
/// Blocking; run it off the async executor.
pub fn export_to_dir(
    dir: &Path,
    criteria: &SearchCriteria,
    table: &ResultTable,
    format: ExportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(criteria, format));
    match format {
        ExportFormat::Xlsx => std::fs::write(&path, write_xlsx(table)?)?,
        ExportFormat::Csv => {
            let file = std::fs::File::create(&path)?;
            write_csv(table, std::io::BufWriter::new(file))?;
        }
    }
    info!(path = %path.display(), rows = table.len(), ?format, "Exported result table");
    Ok(path)
}
