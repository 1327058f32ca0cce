//! Pagination metadata for list responses.

use serde::Serialize;

/// Paging summary returned with every list result.
///
/// All fields are zero when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Derives paging metadata from a total match count.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records - 1) / page_size + 1,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::{calculate_metadata, Metadata};

    #[test]
    fn zero_total_short_circuits_to_empty_metadata() {
        assert_eq!(calculate_metadata(0, 7, 20), Metadata::default());
        assert!(calculate_metadata(0, 1, 1).is_empty());
    }

    #[test]
    fn last_page_rounds_up() {
        let metadata = calculate_metadata(41, 2, 20);
        assert_eq!(
            metadata,
            Metadata {
                current_page: 2,
                page_size: 20,
                first_page: 1,
                last_page: 3,
                total_records: 41,
            }
        );
        assert_eq!(calculate_metadata(40, 1, 20).last_page, 2);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }

    #[test]
    fn page_beyond_last_is_reported_as_requested() {
        let metadata = calculate_metadata(5, 9, 2);
        assert_eq!(metadata.current_page, 9);
        assert_eq!(metadata.last_page, 3);
    }

    #[test]
    fn huge_page_size_does_not_overflow() {
        let metadata = calculate_metadata(1, 1, i64::MAX);
        assert_eq!(metadata.last_page, 1);
        assert_eq!(metadata.page_size, i64::MAX);

        assert_eq!(calculate_metadata(i64::MAX, 1, 1).last_page, i64::MAX);
    }
}
