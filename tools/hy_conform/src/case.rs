//! The fixed case table.
//!
//! Each case names a source file in the suite directory and the exit code
//! its compiled program must return. Table order is report order.

use std::path::{Path, PathBuf};

/// One conformance case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase {
    /// Source file name, relative to the suite directory.
    pub file: &'static str,
    /// Exit code the compiled program must return.
    pub expected_exit_code: i32,
}

impl TestCase {
    pub const fn new(file: &'static str, expected_exit_code: i32) -> Self {
        Self {
            file,
            expected_exit_code,
        }
    }

    pub fn source_path(&self, suite_dir: &Path) -> PathBuf {
        suite_dir.join(self.file)
    }
}

/// Every case, in report order. Both backends run the same table.
pub const CASES: &[TestCase] = &[
    TestCase::new("test.hy", 5),
    TestCase::new("test2.hy", 5),
    TestCase::new("test4.hy", 1),
    TestCase::new("test_fib.hy", 55),
    TestCase::new("test_func.hy", 30),
    TestCase::new("test_print.hy", 0),
    TestCase::new("test_logic.hy", 42),
    TestCase::new("test_for.hy", 10),
    TestCase::new("test_ptr.hy", 20),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_order() {
        assert_eq!(CASES.len(), 9);
        assert_eq!(CASES[0], TestCase::new("test.hy", 5));
        assert_eq!(CASES[8], TestCase::new("test_ptr.hy", 20));
    }

    #[test]
    fn test_file_names_unique() {
        let mut names: Vec<_> = CASES.iter().map(|c| c.file).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CASES.len());
    }

    #[test]
    fn test_expected_codes_fit_exit_status_range() {
        assert!(CASES
            .iter()
            .all(|c| (0..=255).contains(&c.expected_exit_code)));
    }

    #[test]
    fn test_source_path_joins_suite_dir() {
        let case = TestCase::new("test.hy", 5);
        assert_eq!(
            case.source_path(Path::new("/suite")),
            PathBuf::from("/suite/test.hy")
        );
    }
}
