#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::ids::{IdAllocator, MAX_EXPLICIT_SUFFIX, split_id};

    #[test]
    fn test_next_counts_per_prefix() {
        let mut ids = IdAllocator::new();

        assert_eq!(ids.next("student"), "student1");
        assert_eq!(ids.next("student"), "student2");
        assert_eq!(ids.next("pay"), "pay1");
        assert_eq!(ids.high_water("student"), 2);
        assert_eq!(ids.high_water("exp"), 0);
    }

    #[test]
    fn test_observe_raises_the_mark() {
        let mut ids = IdAllocator::new();

        ids.observe("cat7").unwrap();
        assert_eq!(ids.next("cat"), "cat8");

        ids.observe("cat3").unwrap();
        assert_eq!(ids.next("cat"), "cat9");

        ids.observe("cat_mini").unwrap();
        assert_eq!(ids.high_water("cat"), 9);
        assert_eq!(ids.high_water("cat_mini"), 0);
    }

    #[test]
    fn test_observe_rejects_oversized_suffix() {
        let mut ids = IdAllocator::new();
        ids.observe("cat4").unwrap();

        let result = ids.observe("cat18446744073709551615");
        assert!(matches!(result, Err(AppError::Validation(_))));
        let result = ids.observe(&format!("cat{}", MAX_EXPLICIT_SUFFIX + 1));
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert_eq!(ids.high_water("cat"), 4);
        assert_eq!(ids.next("cat"), "cat5");

        ids.observe(&format!("cat{}", MAX_EXPLICIT_SUFFIX)).unwrap();
        assert_eq!(ids.next("cat"), format!("cat{}", MAX_EXPLICIT_SUFFIX + 1));
    }

    #[test]
    fn test_split_id() {
        assert_eq!(split_id("student12"), Some(("student", 12)));
        assert_eq!(split_id("cat_infantil"), None);
        assert_eq!(split_id("42"), None);
        assert_eq!(split_id(""), None);
    }
}
