//! Per-file violation buffer and finalization.

use crate::filter::ViolationFilter;
use crate::types::Violation;
use tracing::debug;

/// Accumulates violations for one file in emission order.
#[derive(Debug, Default)]
pub struct Collector {
    violations: Vec<Violation>,
    next_seq: u64,
}

impl Collector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation, stamping its emission sequence number.
    pub fn collect(&mut self, mut violation: Violation) {
        violation.seq = self.next_seq;
        self.next_seq += 1;
        self.violations.push(violation);
    }

    /// Number of buffered violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the buffered violations in emission order.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Filters and sorts the buffered violations.
    #[must_use]
    pub fn finalize(self, file: &str, filters: &[&dyn ViolationFilter]) -> Vec<Violation> {
        finalize(self.violations, file, filters)
    }
}

/// Drops violations suppressed by any filter and sorts the rest by line,
/// column, reporting check registration index, then emission order.
#[must_use]
pub fn finalize(
    mut violations: Vec<Violation>,
    file: &str,
    filters: &[&dyn ViolationFilter],
) -> Vec<Violation> {
    let before = violations.len();
    violations.retain(|v| !filters.iter().any(|f| f.suppresses(file, v)));
    if violations.len() != before {
        debug!(
            "Suppressed {} violation(s) in {}",
            before - violations.len(),
            file
        );
    }
    violations.sort_by_key(Violation::sort_key);
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(line: usize, column: usize, check: &str, index: usize) -> Violation {
        let mut v = Violation::new(line, column, check, "key", Vec::new());
        v.check_index = index;
        v
    }

    struct DropCheck(&'static str);

    impl ViolationFilter for DropCheck {
        fn suppresses(&self, _file: &str, violation: &Violation) -> bool {
            violation.check_id == self.0
        }
    }

    #[test]
    fn test_collect_assigns_sequence() {
        let mut collector = Collector::new();
        collector.collect(violation(1, 1, "a", 0));
        collector.collect(violation(1, 1, "a", 0));
        let violations = collector.into_violations();
        assert_eq!(violations[0].seq, 0);
        assert_eq!(violations[1].seq, 1);
    }

    #[test]
    fn test_finalize_sorts_by_position() {
        let mut collector = Collector::new();
        collector.collect(violation(3, 1, "a", 0));
        collector.collect(violation(1, 9, "a", 0));
        collector.collect(violation(1, 2, "a", 0));

        let sorted = collector.finalize("A.java", &[]);
        let positions: Vec<_> = sorted.iter().map(|v| (v.line, v.column)).collect();
        assert_eq!(positions, vec![(1, 2), (1, 9), (3, 1)]);
    }

    #[test]
    fn test_ties_break_on_registration_then_emission() {
        let mut collector = Collector::new();
        collector.collect(violation(2, 5, "second", 1));
        collector.collect(violation(2, 5, "first", 0));
        collector.collect(violation(2, 5, "second", 1));
        collector.collect(violation(2, 5, "first", 0));

        let sorted = collector.finalize("A.java", &[]);
        let order: Vec<_> = sorted.iter().map(|v| (v.check_id.as_str(), v.seq)).collect();
        assert_eq!(
            order,
            vec![("first", 1), ("first", 3), ("second", 0), ("second", 2)]
        );
    }

    #[test]
    fn test_any_filter_suppresses() {
        let mut collector = Collector::new();
        collector.collect(violation(1, 1, "a", 0));
        collector.collect(violation(1, 1, "b", 1));
        collector.collect(violation(1, 1, "c", 2));

        let drop_a = DropCheck("a");
        let drop_c = DropCheck("c");
        let kept = collector.finalize("A.java", &[&drop_a, &drop_c]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].check_id, "b");
    }
}
