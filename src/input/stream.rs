//! Tolerant JSON record stream.
//!
//! Accepts a top-level array of objects, a bare sequence of juxtaposed
//! objects, or any mix of the two (as produced by concatenating several
//! files). Array boundaries are skipped; non-object values are logged and
//! dropped. The first syntax error ends the stream.

use crate::types::JsonObject;
use log::warn;
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer, Value};
use std::collections::VecDeque;
use std::io::Read;

pub struct RecordStream<R: Read> {
    values: StreamDeserializer<'static, IoRead<R>, Value>,
    pending: VecDeque<Value>,
    failed: bool,
}

impl<R: Read> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self { values: Deserializer::from_reader(reader).into_iter::<Value>(), pending: VecDeque::new(), failed: false }
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<JsonObject, String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            match self.pending.pop_front() {
                Some(Value::Object(object)) => return Some(Ok(object)),
                Some(Value::Array(items)) => {
                    for item in items.into_iter().rev() {
                        self.pending.push_front(item);
                    }
                }
                Some(other) => warn!("Skipping non-object JSON value: {}", other),
                None => match self.values.next()? {
                    Ok(value) => self.pending.push_back(value),
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(format!("Failed to parse JSON input: {}", e)));
                    }
                },
            }
        }
    }
}
