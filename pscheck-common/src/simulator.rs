//! Reference stack machine.
//!
//! Replays a sequence of [`Operation`]s against a pair of integer stacks. Index 0 of
//! each deque is the top of the stack. Operations on a stack that is too small are
//! silent no-ops, matching push_swap semantics.

use crate::ops::{Operation, UnknownOperation};
use std::collections::VecDeque;

/// The two stacks of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stacks {
    pub a: VecDeque<i32>,
    pub b: VecDeque<i32>,
}

impl Stacks {
    /// A holds `initial` in the given order (first value on top); B is empty.
    pub fn new(initial: &[i32]) -> Self {
        Self {
            a: initial.iter().copied().collect(),
            b: VecDeque::new(),
        }
    }

    /// Total number of elements across both stacks.
    pub fn len(&self) -> usize {
        self.a.len() + self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty()
    }

    /// A is in non-decreasing order from top to bottom.
    pub fn is_sorted(&self) -> bool {
        is_non_decreasing(self.a.iter())
    }

    /// Sorted with nothing left on B.
    pub fn is_solved(&self) -> bool {
        self.b.is_empty() && self.is_sorted()
    }

    pub fn apply(&mut self, op: Operation) {
        match op {
            Operation::Sa => swap(&mut self.a),
            Operation::Sb => swap(&mut self.b),
            Operation::Ss => {
                swap(&mut self.a);
                swap(&mut self.b);
            }
            Operation::Pa => push(&mut self.b, &mut self.a),
            Operation::Pb => push(&mut self.a, &mut self.b),
            Operation::Ra => rotate(&mut self.a),
            Operation::Rb => rotate(&mut self.b),
            Operation::Rr => {
                rotate(&mut self.a);
                rotate(&mut self.b);
            }
            Operation::Rra => reverse_rotate(&mut self.a),
            Operation::Rrb => reverse_rotate(&mut self.b),
            Operation::Rrr => {
                reverse_rotate(&mut self.a);
                reverse_rotate(&mut self.b);
            }
        }
    }

    pub fn apply_all<'a, I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = &'a Operation>,
    {
        for op in ops {
            self.apply(*op);
        }
    }
}

fn swap(stack: &mut VecDeque<i32>) {
    if stack.len() >= 2 {
        stack.swap(0, 1);
    }
}

fn push(src: &mut VecDeque<i32>, dst: &mut VecDeque<i32>) {
    if let Some(value) = src.pop_front() {
        dst.push_front(value);
    }
}

fn rotate(stack: &mut VecDeque<i32>) {
    if !stack.is_empty() {
        stack.rotate_left(1);
    }
}

fn reverse_rotate(stack: &mut VecDeque<i32>) {
    if !stack.is_empty() {
        stack.rotate_right(1);
    }
}

/// Adjacent pairs are all `<=`. Empty and single-element sequences are sorted.
pub fn is_non_decreasing<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a i32>,
{
    let mut iter = values.into_iter();
    let Some(mut prev) = iter.next() else {
        return true;
    };
    for value in iter {
        if value < prev {
            return false;
        }
        prev = value;
    }
    true
}

/// Apply `ops` in order to a fresh machine loaded with `initial`.
pub fn simulate(initial: &[i32], ops: &[Operation]) -> Stacks {
    let mut stacks = Stacks::new(initial);
    stacks.apply_all(ops);
    stacks
}

/// Like [`simulate`], but takes raw tokens and stops at the first one outside the
/// vocabulary.
pub fn simulate_tokens<S: AsRef<str>>(
    initial: &[i32],
    tokens: &[S],
) -> Result<Stacks, UnknownOperation> {
    let mut stacks = Stacks::new(initial);
    for token in tokens {
        let op: Operation = token.as_ref().parse()?;
        stacks.apply(op);
    }
    Ok(stacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Operation::*;

    fn ops(tokens: &str) -> Vec<Operation> {
        crate::ops::parse_operations(tokens).unwrap()
    }

    #[test]
    fn test_empty_sequence_leaves_a_unchanged() {
        let stacks = simulate(&[5, -1, 3], &[]);
        assert_eq!(stacks.a, [5, -1, 3]);
        assert!(stacks.b.is_empty());
    }

    #[test]
    fn test_push_push_pull_fixture() {
        let stacks = simulate(&[3, 1, 2], &ops("pb pb pa"));
        assert_eq!(stacks.a, [1, 2]);
        assert_eq!(stacks.b, [3]);
        assert!(stacks.is_sorted());
        assert!(!stacks.is_solved());
    }

    #[test]
    fn test_every_permutation_of_three_has_known_solution() {
        let fixtures: [(&[i32], &str); 6] = [
            (&[1, 2, 3], ""),
            (&[2, 1, 3], "sa"),
            (&[3, 1, 2], "ra"),
            (&[2, 3, 1], "rra"),
            (&[1, 3, 2], "rra sa"),
            (&[3, 2, 1], "sa rra"),
        ];
        for (input, seq) in fixtures {
            let stacks = simulate(input, &ops(seq));
            assert_eq!(stacks.a, [1, 2, 3], "input {input:?} with {seq:?}");
            assert!(stacks.b.is_empty());
        }
    }

    #[test]
    fn test_swap_semantics() {
        let mut stacks = Stacks::new(&[1, 2, 3]);
        stacks.apply(Sa);
        assert_eq!(stacks.a, [2, 1, 3]);

        stacks.apply(Pb);
        stacks.apply(Pb);
        assert_eq!(stacks.b, [1, 2]);
        stacks.apply(Sb);
        assert_eq!(stacks.b, [2, 1]);

        stacks.apply(Pa);
        stacks.apply(Pb);
        stacks.apply(Ss);
        assert_eq!(stacks.a, [3]);
        assert_eq!(stacks.b, [1, 2]);
    }

    #[test]
    fn test_rotate_semantics() {
        let mut stacks = Stacks::new(&[1, 2, 3, 4]);
        stacks.apply(Ra);
        assert_eq!(stacks.a, [2, 3, 4, 1]);
        stacks.apply(Rra);
        assert_eq!(stacks.a, [1, 2, 3, 4]);

        stacks.apply_all(&[Pb, Pb, Pb]);
        assert_eq!(stacks.b, [3, 2, 1]);
        stacks.apply(Rb);
        assert_eq!(stacks.b, [2, 1, 3]);
        stacks.apply(Rrb);
        assert_eq!(stacks.b, [3, 2, 1]);

        stacks.apply(Pa);
        assert_eq!(stacks.a, [3, 4]);
        stacks.apply(Rr);
        assert_eq!(stacks.a, [4, 3]);
        assert_eq!(stacks.b, [1, 2]);
        stacks.apply(Rrr);
        assert_eq!(stacks.a, [3, 4]);
        assert_eq!(stacks.b, [2, 1]);
    }

    #[test]
    fn test_undersized_operations_are_noops() {
        let mut stacks = Stacks::new(&[7]);
        for op in [Sa, Sb, Ss, Pa, Ra, Rb, Rr, Rra, Rrb, Rrr] {
            stacks.apply(op);
            assert_eq!(stacks.a, [7], "after {op}");
            assert!(stacks.b.is_empty(), "after {op}");
        }

        let mut empty = Stacks::new(&[]);
        for op in Operation::ALL {
            empty.apply(op);
        }
        assert!(empty.is_empty());
    }

    #[test]
    fn test_sortedness() {
        assert!(is_non_decreasing(&[] as &[i32]));
        assert!(is_non_decreasing(&[42]));
        assert!(is_non_decreasing(&[-3, 0, 0, 9]));
        assert!(!is_non_decreasing(&[1, 3, 2]));
    }

    #[test]
    fn test_sorted_input_stays_sorted_without_ops() {
        let stacks = simulate(&[-10, -2, 4, 8], &[]);
        assert!(stacks.is_solved());
    }

    #[test]
    fn test_simulate_tokens_fails_fast_on_unknown() {
        let err = simulate_tokens(&[2, 1], &["sa", "xx", "yy"]).unwrap_err();
        assert_eq!(err.token, "xx");

        let stacks = simulate_tokens(&[2, 1], &["sa"]).unwrap();
        assert_eq!(stacks.a, [1, 2]);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let seq = ops("pb ra pb rr sa pa rra pa");
        let first = simulate(&[4, 9, -2, 7, 0], &seq);
        let second = simulate(&[4, 9, -2, 7, 0], &seq);
        assert_eq!(first, second);
    }

    mod proptest_simulator {
        use super::*;
        use proptest::prelude::*;

        fn operation() -> impl Strategy<Value = Operation> {
            (0..Operation::ALL.len()).prop_map(|idx| Operation::ALL[idx])
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(300))]

            #[test]
            fn test_element_count_is_conserved(
                initial in prop::collection::vec(any::<i32>(), 0..40),
                seq in prop::collection::vec(operation(), 0..200),
            ) {
                let stacks = simulate(&initial, &seq);
                prop_assert_eq!(stacks.len(), initial.len());
            }

            #[test]
            fn test_multiset_is_conserved(
                initial in prop::collection::vec(-100i32..100, 0..30),
                seq in prop::collection::vec(operation(), 0..150),
            ) {
                let stacks = simulate(&initial, &seq);
                let mut after: Vec<i32> = stacks.a.iter().chain(stacks.b.iter()).copied().collect();
                let mut before = initial.clone();
                after.sort_unstable();
                before.sort_unstable();
                prop_assert_eq!(after, before);
            }

            #[test]
            fn test_rotation_round_trip(initial in prop::collection::vec(any::<i32>(), 0..20)) {
                let stacks = simulate(&initial, &[Ra, Rra]);
                prop_assert_eq!(stacks.a.iter().copied().collect::<Vec<_>>(), initial);
            }
        }
    }
}
