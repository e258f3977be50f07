//! Persisted ordering of dataset records
//!
//! Records are ordered by release date, newest first, then by scrape time,
//! newest first. A date that does not parse ranks below every date that does,
//! and two unparseable dates tie on that key. The item URL, ascending, is the
//! last key: records whose dates and scrape times all tie are still ordered by
//! URL rather than left equal, so output never depends on in-memory iteration
//! order.

use crate::storage::Record;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Compares two records in persisted order
fn release_order(a: &Record, b: &Record) -> Ordering {
    // Option orders None below Some, so comparing b to a puts parsed dates first
    b.release_date()
        .cmp(&a.release_date())
        .then_with(|| b.scraped_at().cmp(&a.scraped_at()))
        .then_with(|| a.url.cmp(&b.url))
}

/// Sorts records in place into persisted order
pub fn sort_records<R: Borrow<Record>>(records: &mut [R]) {
    records.sort_by(|a, b| release_order(a.borrow(), b.borrow()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, released: &str, scraped: &str) -> Record {
        Record {
            name: url.to_string(),
            url: url.to_string(),
            released_date: released.to_string(),
            scraped_timestamp: scraped.to_string(),
            ..Record::default()
        }
    }

    fn urls(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_newer_release_first() {
        let mut records = vec![
            record("a", "January 2, 2006", "2024-01-01T00:00:00Z"),
            record("b", "March 15, 2022", "2024-01-01T00:00:00Z"),
            record("c", "July 4, 2019", "2024-01-01T00:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_abbreviated_month_sorts_as_unparseable() {
        let mut records = vec![
            record("abbreviated", "Mar 3, 2021", "2025-01-01T00:00:00Z"),
            record("spelled", "March 3, 2020", "2020-01-01T00:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["spelled", "abbreviated"]);
    }

    #[test]
    fn test_unparseable_release_sorts_oldest() {
        let mut records = vec![
            record("undated", "", "2025-01-01T00:00:00Z"),
            record("garbled", "soon(tm)", "2025-01-01T00:00:00Z"),
            record("dated", "January 2, 2006", "2020-01-01T00:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(records[0].url, "dated");
    }

    #[test]
    fn test_equal_release_breaks_tie_on_scrape_time() {
        let mut records = vec![
            record("earlier", "May 5, 2021", "2024-01-01T08:00:00Z"),
            record("later", "May 5, 2021", "2024-01-01T09:00:00+00:00"),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["later", "earlier"]);
    }

    #[test]
    fn test_scrape_time_compares_across_offsets() {
        // 10:00+02:00 is 08:00Z, earlier than 09:00Z
        let mut records = vec![
            record("offset", "May 5, 2021", "2024-01-01T10:00:00+02:00"),
            record("utc", "May 5, 2021", "2024-01-01T09:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["utc", "offset"]);
    }

    #[test]
    fn test_both_unparseable_release_uses_scrape_time() {
        let mut records = vec![
            record("older", "", "2023-01-01T00:00:00Z"),
            record("newer", "n/a", "2024-01-01T00:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["newer", "older"]);
    }

    #[test]
    fn test_unparseable_scrape_time_sorts_last() {
        let mut records = vec![
            record("broken", "May 5, 2021", "yesterday"),
            record("ok", "May 5, 2021", "2020-01-01T00:00:00Z"),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["ok", "broken"]);
    }

    #[test]
    fn test_sort_matches_comparator() {
        let mut records = vec![
            record("d", "", "bad"),
            record("c", "", "bad"),
            record("b", "June 1, 2020", "2024-02-01T00:00:00Z"),
            record("a", "June 1, 2020", "2024-02-01T00:00:00Z"),
            record("e", "June 2, 2020", ""),
        ];
        sort_records(&mut records);
        assert_eq!(urls(&records), vec!["e", "a", "b", "c", "d"]);

        for pair in records.windows(2) {
            assert_ne!(release_order(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
