//! Composite join keys built from a location code and an item code.

use crate::model::RecordSet;

/// Separator placed between the location code and the item code. It is not
/// escaped, so codes that contain it can produce colliding pairs.
pub const PAIR_SEPARATOR: char = '|';

/// Joins two already trimmed codes into a pair key.
pub fn pair_key(location_code: &str, item_code: &str) -> String {
    let mut key = String::with_capacity(location_code.len() + item_code.len() + 1);
    key.push_str(location_code);
    key.push(PAIR_SEPARATOR);
    key.push_str(item_code);
    key
}

/// Computes the pair key of every row in `records`.
///
/// Both code columns are overwritten in place with their trimmed text so that
/// later stages read the same values the keys were built from. Absent cells
/// and unknown columns count as empty codes.
pub fn build_pairs(records: &mut RecordSet, location_column: &str, item_column: &str) -> Vec<String> {
    let mut pairs = Vec::with_capacity(records.len());
    for row in 0..records.len() {
        let location = records
            .value(row, location_column)
            .unwrap_or_default()
            .trim()
            .to_string();
        let item = records
            .value(row, item_column)
            .unwrap_or_default()
            .trim()
            .to_string();

        pairs.push(pair_key(&location, &item));
        records.set_value(row, location_column, location);
        records.set_value(row, item_column, item);
    }
    pairs
}
