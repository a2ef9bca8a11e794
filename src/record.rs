/// Record classification
///
/// Every incoming object is identified by the wrapper key it carries. The
/// key must map to a nested object; a scalar under the same key does not
/// count. Kinds are checked in a fixed order and the first match wins.
use crate::types::JsonObject;

/// Shape of one top-level record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Run/suite metadata
    Suite,
    /// Scenario/feature definition
    Feature,
    /// Individual scenario result
    Result,
    /// Anything else; reported and skipped
    Unknown,
}

impl RecordKind {
    /// Kinds in evaluation order
    const ORDERED: [RecordKind; 3] = [RecordKind::Suite, RecordKind::Feature, RecordKind::Result];

    /// Wrapper key that identifies this kind
    pub fn key(&self) -> Option<&'static str> {
        match self {
            RecordKind::Suite => Some("suite"),
            RecordKind::Feature => Some("feature"),
            RecordKind::Result => Some("martini"),
            RecordKind::Unknown => None,
        }
    }

    /// Does the object carry this kind's wrapper key with an object value?
    pub fn is(&self, object: &JsonObject) -> bool {
        self.unwrap(object).is_some()
    }

    /// The nested payload under this kind's wrapper key
    pub fn unwrap<'a>(&self, container: &'a JsonObject) -> Option<&'a JsonObject> {
        self.key().and_then(|k| container.get(k)).and_then(|v| v.as_object())
    }

    /// Classify an object; suite beats feature beats result
    pub fn classify(object: &JsonObject) -> RecordKind {
        Self::ORDERED.into_iter().find(|kind| kind.is(object)).unwrap_or(RecordKind::Unknown)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordKind::Suite => "suite",
            RecordKind::Feature => "feature",
            RecordKind::Result => "result",
            RecordKind::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
