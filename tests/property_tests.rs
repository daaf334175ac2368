//! Property-based tests: random inputs checked against a model.

use proptest::prelude::*;

use addressable_heap::{Handle, PairingHeap};

proptest! {
    /// Pushing in any order and draining yields the sorted sequence.
    #[test]
    fn drain_is_sorted(values in prop::collection::vec(any::<u32>(), 0..200)) {
        let mut heap = PairingHeap::min();
        for &value in &values {
            heap.push(value);
        }
        prop_assert_eq!(heap.len(), values.len());

        let mut drained = Vec::with_capacity(values.len());
        while !heap.is_empty() {
            drained.push(*heap.top());
            heap.pop();
        }

        let mut expected = values;
        expected.sort_unstable();
        prop_assert_eq!(drained, expected);
    }

    /// After modify_up the top is never worse than the modified key.
    #[test]
    fn modify_up_bounds_the_top(
        values in prop::collection::vec(any::<u32>(), 1..100),
        at in any::<prop::sample::Index>(),
        new_key in any::<u32>(),
    ) {
        let mut heap = PairingHeap::min();
        let handles: Vec<Handle> = values.iter().map(|&v| heap.push(v)).collect();

        let at = at.index(values.len());
        let new_key = new_key.min(values[at]);
        heap.modify_up(handles[at], new_key);

        prop_assert!(*heap.top() <= new_key);
    }

    /// Arbitrary in-place key rewrites keep the heap equivalent to its
    /// model multiset.
    #[test]
    fn modify_tracks_the_model(
        values in prop::collection::vec(any::<u32>(), 1..60),
        rewrites in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<u32>()),
            0..60,
        ),
    ) {
        let mut heap = PairingHeap::min();
        let handles: Vec<Handle> = values.iter().map(|&v| heap.push(v)).collect();
        let mut model = values;

        for (at, new_key) in rewrites {
            let at = at.index(model.len());
            // Either direction; modify delegates upward moves internally.
            heap.modify(handles[at], new_key);
            model[at] = new_key;

            let min = *model.iter().min().unwrap();
            prop_assert_eq!(*heap.top(), min);
            prop_assert_eq!(heap.len(), model.len());
        }

        let mut drained = Vec::with_capacity(model.len());
        while !heap.is_empty() {
            drained.push(*heap.top());
            heap.pop();
        }
        model.sort_unstable();
        prop_assert_eq!(drained, model);
    }

    /// len() is exactly pushes minus pops, whatever the interleaving.
    #[test]
    fn len_counts_pushes_minus_pops(ops in prop::collection::vec(any::<Option<u32>>(), 0..200)) {
        let mut heap = PairingHeap::min();
        let mut live = 0usize;
        for op in ops {
            match op {
                Some(value) => {
                    heap.push(value);
                    live += 1;
                }
                None if live > 0 => {
                    heap.pop();
                    live -= 1;
                }
                None => {}
            }
            prop_assert_eq!(heap.len(), live);
            prop_assert_eq!(heap.is_empty(), live == 0);
        }
    }
}
