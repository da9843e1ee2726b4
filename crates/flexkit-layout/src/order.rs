//! Order-aware child traversal for flex containers.
//!
//! Children are visited in ascending `order` value; children sharing a value
//! keep their original sibling order. Rather than sorting the children, the
//! iterator precomputes the sorted set of distinct `order` values once per
//! layout pass and scans the sibling list once per value — O(n·k) for k
//! distinct values, and k is almost always 1.

use smallvec::SmallVec;
use tracing::trace;

/// Restartable iterator yielding child indices in `order`-sorted traversal.
///
/// The distinct-value cache is the only state that survives between layout
/// passes, and it is rebuilt by [`OrderIterator::set_order_values`] at the
/// start of each pass, so stale `order` styles can never leak through.
#[derive(Debug, Default)]
pub struct OrderIterator {
    /// Per-child `order` value, in sibling order.
    orders: Vec<i32>,
    /// Sorted distinct `order` values.
    order_values: SmallVec<[i32; 8]>,
    /// Index into `order_values` for the group being scanned.
    current_value: usize,
    /// Next sibling index to examine within the current group.
    next_child: usize,
}

impl OrderIterator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the traversal from the children's current `order` styles.
    /// Also resets the iterator.
    pub fn set_order_values<I>(&mut self, orders: I)
    where
        I: IntoIterator<Item = i32>,
    {
        self.orders.clear();
        self.orders.extend(orders);
        self.order_values.clear();
        for &order in &self.orders {
            if let Err(slot) = self.order_values.binary_search(&order) {
                self.order_values.insert(slot, order);
            }
        }
        trace!(
            children = self.orders.len(),
            distinct = self.order_values.len(),
            "Order iterator rebuilt"
        );
        self.reset();
    }

    /// Restart the traversal from the first child in order.
    pub fn reset(&mut self) {
        self.current_value = 0;
        self.next_child = 0;
    }

    /// Restart and return the first child index, or `None` if empty.
    pub fn first(&mut self) -> Option<usize> {
        self.reset();
        self.next()
    }
}

impl Iterator for OrderIterator {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current_value < self.order_values.len() {
            let wanted = self.order_values[self.current_value];
            while self.next_child < self.orders.len() {
                let child = self.next_child;
                self.next_child += 1;
                if self.orders[child] == wanted {
                    return Some(child);
                }
            }
            self.current_value += 1;
            self.next_child = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(orders: &[i32]) -> Vec<usize> {
        let mut iter = OrderIterator::new();
        iter.set_order_values(orders.iter().copied());
        iter.collect()
    }

    #[test]
    fn test_default_order_preserves_sibling_order() {
        assert_eq!(collect(&[0, 0, 0, 0]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_distinct_orders_sort_ascending() {
        // Source order A(order 0), B(order -1): B is visited first.
        assert_eq!(collect(&[0, -1]), vec![1, 0]);
    }

    #[test]
    fn test_ties_keep_sibling_order() {
        assert_eq!(collect(&[1, 0, 1, 0]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_negative_and_duplicate_orders() {
        assert_eq!(collect(&[5, -3, 5, -3, 0]), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_extreme_order_values_are_legal() {
        // No reserved sentinels: the full i32 range is usable.
        assert_eq!(collect(&[i32::MIN, i32::MAX, i32::MIN + 1]), vec![0, 2, 1]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(collect(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_reset_and_first_restart() {
        let mut iter = OrderIterator::new();
        iter.set_order_values([2, 1, 2].into_iter());
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), Some(0));
        // Restart mid-traversal.
        assert_eq!(iter.first(), Some(1));
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
        iter.reset();
        assert_eq!(iter.next(), Some(1));
    }

    #[test]
    fn test_rebuild_replaces_previous_orders() {
        let mut iter = OrderIterator::new();
        iter.set_order_values([3, 2, 1].into_iter());
        assert_eq!(iter.next(), Some(2));
        iter.set_order_values([0, 0].into_iter());
        assert_eq!(iter.by_ref().collect::<Vec<_>>(), vec![0, 1]);
    }
}
