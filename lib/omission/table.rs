//! The module-wide omission table.
//!
//! One entry per basic block with proven dependences, appended in
//! first-encountered order across the whole program. The position of an
//! entry is its identifier, referenced by the report call inserted into
//! the block.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An ordered sequence of per-block dependence-descriptor sets.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OmissionTable {
    entries: Vec<BTreeSet<String>>,
}

impl OmissionTable {
    pub fn new() -> OmissionTable {
        OmissionTable::default()
    }

    /// Appends a descriptor set and returns its assigned index.
    pub fn push(&mut self, descriptors: BTreeSet<String>) -> usize {
        let index = self.entries.len();
        self.entries.push(descriptors);
        index
    }

    pub fn entries(&self) -> &[BTreeSet<String>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The canonical serialization: entries joined with `/`, descriptors
    /// within an entry joined with `,`. The empty table encodes to `""`.
    ///
    /// Descriptor text is not escaped, so descriptors must not contain
    /// either delimiter.
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|descriptors| {
                descriptors
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<&str>>()
                    .join(",")
            })
            .collect::<Vec<String>>()
            .join("/")
    }

    /// Reconstructs a table from its canonical serialization.
    pub fn decode(encoded: &str) -> OmissionTable {
        if encoded.is_empty() {
            return OmissionTable::new();
        }
        OmissionTable {
            entries: encoded
                .split('/')
                .map(|entry| {
                    entry
                        .split(',')
                        .filter(|descriptor| !descriptor.is_empty())
                        .map(String::from)
                        .collect()
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(strings: &[&str]) -> BTreeSet<String> {
        strings.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn push_assigns_sequential_indices() {
        let mut table = OmissionTable::new();
        assert_eq!(table.push(descriptors(&["1:4 RAW 1:3|a"])), 0);
        assert_eq!(table.push(descriptors(&["1:9 WAW 1:8|b"])), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn encode_joins_entries_and_descriptors() {
        let mut table = OmissionTable::new();
        table.push(descriptors(&["1:4 RAW 1:3|a", "1:5 WAR 1:4|a"]));
        table.push(descriptors(&["1:9 WAW 1:8|b"]));
        assert_eq!(
            table.encode(),
            "1:4 RAW 1:3|a,1:5 WAR 1:4|a/1:9 WAW 1:8|b"
        );
    }

    #[test]
    fn empty_table_encodes_to_empty_string() {
        assert_eq!(OmissionTable::new().encode(), "");
        assert!(OmissionTable::decode("").is_empty());
    }

    #[test]
    fn decode_round_trips() {
        let mut table = OmissionTable::new();
        table.push(descriptors(&["1:4 RAW 1:3|a", "1:5 WAR 1:4|a"]));
        table.push(descriptors(&["1:9 WAW 1:8|b"]));
        assert_eq!(OmissionTable::decode(&table.encode()), table);
    }
}
