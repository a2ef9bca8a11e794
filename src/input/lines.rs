//! Legacy line-oriented record assembly.
//!
//! Some producers interleave JSON fragments with other output, one object
//! spread over many lines. The assembler counts `{` and `}` per line and
//! treats an object as complete once the counts are equal after having gone
//! positive. Braces inside string literals are counted too, as the producers
//! of this format never escape them.

use crate::types::JsonObject;
use log::{debug, warn};
use serde_json::Value;
use std::io::{BufRead, Lines};

/// Accumulates lines until one object is complete
#[derive(Debug, Default)]
pub struct LineAssembler {
    opening: usize,
    closing: usize,
    lines: Vec<String>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one line; returns true once the accumulated object is complete.
    ///
    /// Lines seen before the first brace are ignored.
    pub fn push_line(&mut self, line: &str) -> bool {
        let opening = line.matches('{').count();
        let closing = line.matches('}').count();

        if self.lines.is_empty() && opening == 0 && closing == 0 {
            return false;
        }

        self.opening += opening;
        self.closing += closing;
        self.lines.push(line.trim().to_string());
        self.opening > 0 && self.opening == self.closing
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Take the accumulated text, joined with newlines, and reset
    pub fn take(&mut self) -> String {
        let joined = self.lines.join("\n");
        *self = Self::default();
        joined
    }
}

/// Iterator over objects assembled from a line-oriented reader
pub struct LineRecords<R: BufRead> {
    lines: Lines<R>,
    assembler: LineAssembler,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> LineRecords<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), assembler: LineAssembler::new(), line_number: 0, done: false }
    }

    fn fail(&mut self, message: String) -> Option<Result<JsonObject, String>> {
        self.done = true;
        Some(Err(message))
    }
}

impl<R: BufRead> Iterator for LineRecords<R> {
    type Item = Result<JsonObject, String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return self.fail(format!("Failed to read input: {}", e)),
                None => {
                    self.done = true;
                    if !self.assembler.is_empty() {
                        return Some(Err(format!(
                            "Unterminated JSON object at end of input (line {})",
                            self.line_number
                        )));
                    }
                    return None;
                }
            };
            self.line_number += 1;

            if !self.assembler.push_line(&line) {
                continue;
            }

            let text = self.assembler.take();
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(object)) => return Some(Ok(object)),
                Ok(other) => warn!("Skipping non-object JSON value ending at line {}: {}", self.line_number, other),
                Err(e) => {
                    debug!("Unparseable fragment:\n{}", text);
                    return self.fail(format!("Failed to parse JSON ending at line {}: {}", self.line_number, e));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembler_completes_on_balanced_braces() {
        let mut assembler = LineAssembler::new();
        assert!(!assembler.push_line("  {"));
        assert!(!assembler.push_line("    \"martini\": {\"name\": \"x\""));
        assert!(!assembler.push_line("    }"));
        assert!(assembler.push_line("}   "));
        assert_eq!(assembler.take(), "{\n\"martini\": {\"name\": \"x\"\n}\n}");
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_assembler_ignores_leading_noise() {
        let mut assembler = LineAssembler::new();
        assert!(!assembler.push_line("INFO starting run"));
        assert!(!assembler.push_line(""));
        assert!(assembler.is_empty());
        assert!(assembler.push_line("{\"a\": 1}"));
    }

    #[test]
    fn test_line_records_yields_each_object() {
        let input = "log line\n{\n\"suite\": {\"id\": \"S1\"}\n}\n\n{\"feature\": {\"id\": \"F1\"}}\n";
        let records: Vec<JsonObject> = LineRecords::new(input.as_bytes()).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].contains_key("suite"));
        assert!(records[1].contains_key("feature"));
    }

    #[test]
    fn test_unterminated_object_is_error() {
        let input = "{\"a\": 1}\n{\n\"b\": {\n";
        let records: Vec<Result<JsonObject, String>> = LineRecords::new(input.as_bytes()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_ok());
        assert!(records[1].as_ref().unwrap_err().contains("Unterminated"));
    }

    #[test]
    fn test_malformed_object_stops_iteration() {
        let input = "{\"a\": }\n{\"b\": 2}\n";
        let records: Vec<Result<JsonObject, String>> = LineRecords::new(input.as_bytes()).collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].as_ref().unwrap_err().contains("line 1"));
    }
}
