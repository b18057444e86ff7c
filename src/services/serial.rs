//! Sequential serial numbers
//!
//! Radio stations carry a human-facing serial such as `RAD-007`. New records
//! get the next number after the highest existing one.

use crate::models::FieldAccess;

/// Next `PREFIX-NNN` serial after the highest one found in `field`.
///
/// Values that do not have the exact `PREFIX-<digits>` shape are ignored, as
/// are numbers that do not fit in a `u64`. The number is zero-padded to
/// `width` digits and grows past it if needed.
pub fn next_serial<R: FieldAccess>(records: &[R], field: &str, prefix: &str, width: usize) -> String {
    let highest = records
        .iter()
        .filter_map(|record| {
            record
                .field(field)
                .as_text()
                .and_then(|serial| parse_serial(&serial, prefix))
        })
        .max()
        .unwrap_or(0);

    // Widened so the successor of u64::MAX is still a fresh number
    let next = u128::from(highest) + 1;
    format!("{}-{:0width$}", prefix, next, width = width)
}

fn parse_serial(serial: &str, prefix: &str) -> Option<u64> {
    let digits = serial.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use proptest::prelude::*;

    fn radios(serials: &[&str]) -> Vec<Record> {
        serials.iter().map(|sn| Record::new().with("sn", *sn)).collect()
    }

    #[test]
    fn test_first_serial() {
        assert_eq!(next_serial::<Record>(&[], "sn", "RAD", 3), "RAD-001");
    }

    #[test]
    fn test_next_after_highest() {
        let records = radios(&["RAD-001", "RAD-007", "RAD-002"]);
        assert_eq!(next_serial(&records, "sn", "RAD", 3), "RAD-008");
    }

    #[test]
    fn test_malformed_serials_are_ignored() {
        let mut records = radios(&["RAD-1x", "rad-050", "RAD-", "RAD-900-2", "TV-010", "RAD-004"]);
        records.push(Record::new());
        assert_eq!(next_serial(&records, "sn", "RAD", 3), "RAD-005");
    }

    #[test]
    fn test_grows_past_width() {
        let records = radios(&["RAD-999"]);
        assert_eq!(next_serial(&records, "sn", "RAD", 3), "RAD-1000");
    }

    #[test]
    fn test_successor_of_largest_number_is_fresh() {
        let highest = format!("RAD-{}", u64::MAX);
        let records = radios(&["RAD-001", &highest]);
        assert_eq!(next_serial(&records, "sn", "RAD", 3), "RAD-18446744073709551616");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// The next serial is never one that already exists
        #[test]
        fn next_serial_is_fresh(numbers in prop::collection::vec(0u64..5000, 0..30)) {
            let serials: Vec<String> = numbers.iter().map(|n| format!("RAD-{:03}", n)).collect();
            let records: Vec<Record> = serials.iter().map(|sn| Record::new().with("sn", sn.as_str())).collect();

            let next = next_serial(&records, "sn", "RAD", 3);
            prop_assert!(!serials.contains(&next));
            prop_assert_eq!(parse_serial(&next, "RAD"), Some(numbers.iter().max().map_or(1, |n| n + 1)));
        }

        /// Freshness holds across the whole numeric range
        #[test]
        fn next_serial_is_fresh_near_the_top(numbers in prop::collection::vec(u64::MAX - 3..=u64::MAX, 1..5)) {
            let serials: Vec<String> = numbers.iter().map(|n| format!("RAD-{}", n)).collect();
            let records: Vec<Record> = serials.iter().map(|sn| Record::new().with("sn", sn.as_str())).collect();

            let next = next_serial(&records, "sn", "RAD", 3);
            prop_assert!(!serials.contains(&next));
        }
    }
}
