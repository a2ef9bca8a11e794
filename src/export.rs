//! Workbook export.
//!
//! Translates a finished [`Document`] into an `.xlsx` workbook. All styling
//! decisions have already been made on the in-memory sheets; this module
//! only maps semantic styles onto `rust_xlsxwriter` formats.

use crate::input::file_url_to_path;
use crate::sheet::{BorderWeight, CellStyle, CellValue, Document, Sheet};
use chrono::{DateTime, Local, NaiveDate};
use log::debug;
use rust_xlsxwriter::{Format, FormatBorder, FormatPattern, Workbook};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Font size of unstyled cells, in points
const DEFAULT_FONT_SIZE: f64 = 11.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Spreadsheet date serial (days since 1899-12-30, fractional) of an epoch
/// timestamp, in local time
pub fn excel_serial(epoch_ms: i64) -> Option<f64> {
    let local = DateTime::from_timestamp_millis(epoch_ms)?.with_timezone(&Local).naive_local();
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    Some((local - epoch).num_milliseconds() as f64 / MS_PER_DAY)
}

fn border(weight: BorderWeight) -> FormatBorder {
    match weight {
        BorderWeight::None => FormatBorder::None,
        BorderWeight::Thin => FormatBorder::Thin,
        BorderWeight::Medium => FormatBorder::Medium,
    }
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(color.rgb());
    }
    if style.font_scale != 100 {
        format = format.set_font_size(DEFAULT_FONT_SIZE * f64::from(style.font_scale) / 100.0);
    }
    if let Some(fill) = style.fill {
        format = format.set_pattern(FormatPattern::Solid).set_background_color(fill.rgb());
    }

    let borders = &style.borders;
    if borders.top != BorderWeight::None {
        format = format.set_border_top(border(borders.top));
    }
    if borders.bottom != BorderWeight::None {
        format = format.set_border_bottom(border(borders.bottom));
    }
    if borders.left != BorderWeight::None {
        format = format.set_border_left(border(borders.left));
    }
    if borders.right != BorderWeight::None {
        format = format.set_border_right(border(borders.right));
    }
    if let Some(color) = style.border_color.filter(|_| !borders.is_empty()) {
        format = format.set_border_color(color.rgb());
    }

    if style.wrap {
        format = format.set_text_wrap();
    }
    if let Some(ref num_format) = style.num_format {
        format = format.set_num_format(num_format);
    }
    format
}

fn write_sheet(workbook: &mut Workbook, sheet: &Sheet) -> Result<(), String> {
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet.name())
        .map_err(|e| format!("Failed to name sheet '{}': {}", sheet.name(), e))?;

    for (r, cells) in sheet.rows().iter().enumerate() {
        let row = u32::try_from(r).map_err(|_| format!("Too many rows in sheet '{}'", sheet.name()))?;
        for (c, cell) in cells.iter().enumerate() {
            let col = u16::try_from(c).map_err(|_| format!("Too many columns in sheet '{}'", sheet.name()))?;
            let format = to_format(&cell.style);

            let written = match &cell.value {
                CellValue::Text(s) => worksheet.write_string_with_format(row, col, s, &format),
                CellValue::Number(n) => worksheet.write_number_with_format(row, col, *n, &format),
                CellValue::DateTime(ms) => match excel_serial(*ms) {
                    Some(serial) => worksheet.write_number_with_format(row, col, serial, &format),
                    None => worksheet.write_string_with_format(row, col, &ms.to_string(), &format),
                },
                CellValue::Empty => worksheet.write_blank(row, col, &format),
            };
            written.map_err(|e| format!("Failed to write cell ({}, {}) of '{}': {}", r, c, sheet.name(), e))?;
        }
    }

    worksheet.autofit();
    Ok(())
}

/// Render the document as xlsx bytes: results sheet first, then suites
pub fn render_workbook(document: &Document) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    write_sheet(&mut workbook, &document.results)?;
    write_sheet(&mut workbook, &document.suites)?;
    workbook.save_to_buffer().map_err(|e| format!("Failed to create workbook: {}", e))
}

/// Output location from a path or `file://` URL
pub fn resolve_output_path(spec: &str) -> Result<PathBuf, String> {
    file_url_to_path(spec).ok_or_else(|| format!("Unsupported output resource: {}", spec))
}

/// Write the workbook to `path`.
///
/// The bytes go to a temporary file in the destination directory first and
/// replace `path` only once fully written. With `clobber` false an existing
/// destination is an error.
pub fn save_workbook(document: &Document, path: &Path, clobber: bool) -> Result<(), String> {
    if !clobber && path.exists() {
        return Err(format!("Output {} already exists (remove it or drop --no-clobber)", path.display()));
    }

    let bytes = render_workbook(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| format!("Failed to create temporary file in {}: {}", dir.display(), e))?;
    temp.write_all(&bytes).map_err(|e| format!("Failed to write {}: {}", temp.path().display(), e))?;

    debug!("Persisting {} bytes to {}", bytes.len(), path.display());
    let persisted = if clobber { temp.persist(path) } else { temp.persist_noclobber(path) };
    persisted.map_err(|e| format!("Failed to write {}: {}", path.display(), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Borders, Cell, Fill, FontColor};
    use std::fs;
    use tempfile::TempDir;

    fn sample_document() -> Document {
        let mut document = Document::new("Results", "Suites");
        document.results.push_text_row(&["Scenario", "Execution (ms)"], &CellStyle::header());
        document.results.push_cells(vec![
            Cell { value: CellValue::Text("login".to_string()), ..Cell::default() },
            Cell { value: CellValue::Number(1500.0), ..Cell::default() },
        ]);
        document.suites.push_text_row(&["ID", "Date"], &CellStyle::header());
        document.suites.push_cells(vec![
            Cell { value: CellValue::Text("S1".to_string()), ..Cell::default() },
            Cell {
                value: CellValue::DateTime(1_600_000_000_000),
                style: CellStyle { num_format: Some("m/d/yy h:mm".to_string()), ..CellStyle::default() },
            },
        ]);
        document
    }

    #[test]
    fn test_excel_serial_is_days_since_1899() {
        let serial = excel_serial(0).unwrap();
        // 1970-01-01 is serial 25569; the local offset moves it by under a day
        assert!((serial - 25569.0).abs() < 1.0, "serial {}", serial);

        let one_day_later = excel_serial(86_400_000).unwrap();
        assert!((one_day_later - serial - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_to_format_maps_status_fill_and_emphasis() {
        let style = CellStyle {
            bold: true,
            font_color: Some(FontColor::DarkRed),
            fill: Some(Fill::Rose),
            borders: Borders {
                top: BorderWeight::Thin,
                bottom: BorderWeight::Thin,
                left: BorderWeight::Thin,
                right: BorderWeight::Thin,
            },
            border_color: Some(FontColor::Black),
            ..CellStyle::default()
        };
        let expected = Format::new()
            .set_bold()
            .set_font_color(0x800000)
            .set_pattern(FormatPattern::Solid)
            .set_background_color(0xFF99CC)
            .set_border_top(FormatBorder::Thin)
            .set_border_bottom(FormatBorder::Thin)
            .set_border_left(FormatBorder::Thin)
            .set_border_right(FormatBorder::Thin)
            .set_border_color(0x000000);
        assert_eq!(to_format(&style), expected);
    }

    #[test]
    fn test_to_format_maps_header_and_longest_duration() {
        let header = Format::new().set_bold().set_font_color(0x000000).set_border_bottom(FormatBorder::Medium);
        assert_eq!(to_format(&CellStyle::header()), header);

        let longest = CellStyle {
            bold: true,
            font_color: Some(FontColor::DarkRed),
            font_scale: 150,
            ..CellStyle::default()
        };
        let expected = Format::new().set_bold().set_font_color(0x800000).set_font_size(16.5);
        assert_eq!(to_format(&longest), expected);

        assert_eq!(to_format(&CellStyle::default()), Format::new());
    }

    #[test]
    fn test_render_workbook_with_every_style() {
        let mut document = sample_document();
        document.results.push_cells(vec![Cell {
            value: CellValue::Number(1.0),
            style: CellStyle {
                bold: true,
                font_color: Some(FontColor::DarkRed),
                font_scale: 150,
                fill: Some(Fill::Rose),
                borders: Borders {
                    top: BorderWeight::Medium,
                    bottom: BorderWeight::Medium,
                    left: BorderWeight::Thin,
                    right: BorderWeight::Thin,
                },
                border_color: Some(FontColor::Black),
                wrap: true,
                num_format: Some("0".to_string()),
            },
        }]);
        document.results.push_row(2);

        let bytes = render_workbook(&document).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_workbook_produces_zip() {
        let bytes = render_workbook(&sample_document()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_save_workbook_respects_no_clobber() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.xlsx");

        save_workbook(&sample_document(), &path, false).unwrap();
        assert!(fs::read(&path).unwrap().starts_with(b"PK"));

        let err = save_workbook(&sample_document(), &path, false).unwrap_err();
        assert!(err.contains("already exists"));

        save_workbook(&sample_document(), &path, true).unwrap();
    }

    #[test]
    fn test_resolve_output_path() {
        assert_eq!(resolve_output_path("file:///tmp/r.xlsx").unwrap(), PathBuf::from("/tmp/r.xlsx"));
        assert_eq!(resolve_output_path("out/r.xlsx").unwrap(), PathBuf::from("out/r.xlsx"));
        assert!(resolve_output_path("https://example.com/r.xlsx").is_err());
    }
}
