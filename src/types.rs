/// Core data structures for ingested records
///
/// This module defines the suite and feature records that the correlation
/// state stores while results stream past. Both are immutable once built.
use crate::json_helpers::{get_i64, get_object, get_string, get_string_list, scalar_string};
use serde_json::Value;
use std::collections::BTreeMap;

/// A decoded top-level JSON object
pub type JsonObject = serde_json::Map<String, Value>;

/// Machine a suite ran on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Host {
    pub name: Option<String>,
    pub ip: Option<String>,
    pub username: Option<String>,
}

/// One test-run execution context
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suite {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub start_timestamp: Option<i64>,
    pub name: Option<String>,
    pub host: Host,
    /// None when the record carries no profile list at all
    pub profiles: Option<Vec<String>>,
    /// Sorted by variable name; None when the record carries no environment
    pub environment: Option<BTreeMap<String, String>>,
}

impl Suite {
    /// Build a suite from the object found under the `suite` wrapper key.
    ///
    /// Missing fields are left empty; a missing id becomes "".
    pub fn from_json(object: &JsonObject) -> Self {
        let host = get_object(object, "host")
            .map(|h| Host {
                name: get_string(h, "name"),
                ip: get_string(h, "ip"),
                username: get_string(h, "username"),
            })
            .unwrap_or_default();

        let environment = get_object(object, "environmentVariables").map(|vars| {
            vars.iter()
                .map(|(k, v)| (k.clone(), scalar_string(v).unwrap_or_default()))
                .collect::<BTreeMap<_, _>>()
        });

        Suite {
            id: get_string(object, "id").unwrap_or_default(),
            start_timestamp: get_i64(object, "startTimestamp"),
            name: get_string(object, "name"),
            host,
            profiles: get_string_list(object, "profiles"),
            environment,
        }
    }
}

/// A named, located feature file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feature {
    pub id: String,
    pub name: Option<String>,
    pub location: Option<String>,
}

impl Feature {
    /// Build a feature from the object found under the `feature` wrapper key
    pub fn from_json(object: &JsonObject) -> Self {
        Feature {
            id: get_string(object, "id").unwrap_or_default(),
            name: get_string(object, "name"),
            location: get_string(object, "location"),
        }
    }
}
