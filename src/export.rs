use std::fs::File;
use std::io::Write;
use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::report::{Report, ReportRow};

/// export column order
pub const REPORT_COLUMNS: [&str; 8] = [
    "code",
    "name",
    "guardian_name",
    "address",
    "contact",
    "admission_date",
    "monthly_fee",
    "due",
];

/// tabular encodings a report can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// `<stem>.<extension>`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

fn csv_record(row: &ReportRow) -> [String; 8] {
    [
        row.code.clone(),
        row.name.clone(),
        row.guardian_name.clone(),
        row.address.clone(),
        row.contact.clone(),
        row.admission_date.format("%Y-%m-%d").to_string(),
        row.monthly_fee.to_string(),
        row.due.to_string(),
    ]
}

/// write a header and one record per row
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(REPORT_COLUMNS)?;
    for row in rows {
        wtr.write_record(csv_record(row))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(rows: &[ReportRow]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    // csv writer only emits the utf-8 we hand it
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn spreadsheet_number(amount: Money) -> Result<f64> {
    amount.as_decimal().to_f64().ok_or_else(|| LedgerError::Overflow {
        what: format!("spreadsheet value {}", amount),
    })
}

/// single-sheet workbook: bold header row, then one row per report line
/// with amounts as 2 dp numbers
pub fn to_xlsx_bytes(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Report")?;
    for (col, title) in REPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.code)?;
        sheet.write_string(r, 1, &row.name)?;
        sheet.write_string(r, 2, &row.guardian_name)?;
        sheet.write_string(r, 3, &row.address)?;
        sheet.write_string(r, 4, &row.contact)?;
        sheet.write_string(r, 5, row.admission_date.format("%Y-%m-%d").to_string())?;
        sheet.write_number_with_format(r, 6, spreadsheet_number(row.monthly_fee)?, &money)?;
        sheet.write_number_with_format(r, 7, spreadsheet_number(row.due)?, &money)?;
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn to_json_pretty(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// encode a report into any writer
pub fn write_report<W: Write>(report: &Report, format: ExportFormat, mut writer: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(&report.rows, writer),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
            Ok(())
        }
        ExportFormat::Xlsx => {
            writer.write_all(&to_xlsx_bytes(&report.rows)?)?;
            Ok(())
        }
    }
}

/// write a report file, replacing any existing one
pub fn export_to_path(report: &Report, format: ExportFormat, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_report(report, format, file)
}
