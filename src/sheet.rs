/// In-memory spreadsheet model
///
/// This module handles:
/// - Rows of cells holding a value and a semantic style
/// - Addressing cells by (row, column) instead of by object identity
/// - The two-sheet document produced by one report run
///
/// Nothing here knows about the xlsx format; the export module turns a
/// finished `Document` into a workbook.

/// Position of a cell inside one sheet (both zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Content of a single cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    /// Milliseconds since the Unix epoch, rendered with the cell's number format
    DateTime(i64),
}

impl CellValue {
    /// Text content, if this is a text cell
    #[cfg(test)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Line weight of one cell edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderWeight {
    #[default]
    None,
    Thin,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    pub top: BorderWeight,
    pub bottom: BorderWeight,
    pub left: BorderWeight,
    pub right: BorderWeight,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        *self == Borders::default()
    }
}

/// Row background used for status coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Tan,
    Lime,
    Rose,
}

impl Fill {
    pub fn rgb(&self) -> u32 {
        match self {
            Fill::Tan => 0xFFCC99,
            Fill::Lime => 0x99CC00,
            Fill::Rose => 0xFF99CC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontColor {
    Black,
    DarkRed,
}

impl FontColor {
    pub fn rgb(&self) -> u32 {
        match self {
            FontColor::Black => 0x000000,
            FontColor::DarkRed => 0x800000,
        }
    }
}

/// Semantic style of a cell.
///
/// Formatting passes only ever adjust individual fields, so an earlier
/// treatment (a fill, a border) survives a later one (a font change).
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub font_color: Option<FontColor>,
    /// Font size relative to the sheet default, in percent
    pub font_scale: u16,
    pub fill: Option<Fill>,
    pub borders: Borders,
    /// Border color applied to every drawn edge
    pub border_color: Option<FontColor>,
    pub wrap: bool,
    pub num_format: Option<String>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            bold: false,
            font_color: None,
            font_scale: 100,
            fill: None,
            borders: Borders::default(),
            border_color: None,
            wrap: false,
            num_format: None,
        }
    }
}

impl CellStyle {
    /// Style of the header row on both sheets
    pub fn header() -> Self {
        Self {
            bold: true,
            font_color: Some(FontColor::Black),
            borders: Borders { bottom: BorderWeight::Medium, ..Borders::default() },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.value = CellValue::Text(text.into());
    }

    pub fn set_number(&mut self, n: f64) {
        self.value = CellValue::Number(n);
    }
}

/// A named grid of cells; rows may have different widths
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rows: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a row of `width` empty cells and return its index
    pub fn push_row(&mut self, width: usize) -> usize {
        self.rows.push(vec![Cell::default(); width]);
        self.rows.len() - 1
    }

    /// Append a row of styled text cells and return its index
    pub fn push_text_row<S: AsRef<str>>(&mut self, values: &[S], style: &CellStyle) -> usize {
        let row = values
            .iter()
            .map(|v| Cell { value: CellValue::Text(v.as_ref().to_string()), style: style.clone() })
            .collect();
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Append a fully built row and return its index
    pub fn push_cells(&mut self, cells: Vec<Cell>) -> usize {
        self.rows.push(cells);
        self.rows.len() - 1
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut [Cell]> {
        self.rows.get_mut(row).map(|r| r.as_mut_slice())
    }

    #[cfg(test)]
    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.rows.get(at.row).and_then(|r| r.get(at.col))
    }

    pub fn cell_mut(&mut self, at: CellRef) -> Option<&mut Cell> {
        self.rows.get_mut(at.row).and_then(|r| r.get_mut(at.col))
    }
}

/// Output of one report run: the results matrix and the suites summary
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub results: Sheet,
    pub suites: Sheet,
}

impl Document {
    pub fn new(results_name: &str, suites_name: &str) -> Self {
        Self { results: Sheet::new(results_name), suites: Sheet::new(suites_name) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_creates_empty_cells() {
        let mut sheet = Sheet::new("Results");
        let first = sheet.push_row(3);
        let second = sheet.push_row(2);

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(sheet.rows()[0].len(), 3);
        assert_eq!(sheet.cell(CellRef::new(1, 1)).map(|c| &c.value), Some(&CellValue::Empty));
        assert!(sheet.cell(CellRef::new(1, 2)).is_none());
    }

    #[test]
    fn test_cell_mut_writes_through() {
        let mut sheet = Sheet::new("Results");
        sheet.push_row(2);
        sheet.cell_mut(CellRef::new(0, 1)).unwrap().set_text("Login");

        assert_eq!(sheet.cell(CellRef::new(0, 1)).unwrap().value.as_text(), Some("Login"));
    }

    #[test]
    fn test_header_style_has_medium_bottom_border() {
        let style = CellStyle::header();
        assert!(style.bold);
        assert_eq!(style.borders.bottom, BorderWeight::Medium);
        assert_eq!(style.borders.top, BorderWeight::None);
    }
}
