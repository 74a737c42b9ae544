//! Integer partitions in multiplicity representation.
//!
//! A partition of `n` is stored as pairs `(y_i, c_i)` of distinct parts
//! `y_1 < y_2 < ... < y_h` and their multiplicities, with
//! `sum(c_i * y_i) == n`.
//!
//! [`PartitionGenerator`] walks all partitions of `n` (or only those with
//! exactly `k` parts) in a fixed order, using the successor step of
//! Algorithm Z from A. Zoghbi, "Algorithms for generating integer
//! partitions", University of Ottawa (1993). For `n = 6`:
//!
//! ```text
//! 1*6
//! 1*1 + 1*5
//! 1*2 + 1*4
//! 2*3
//! 2*1 + 1*4
//! 1*1 + 1*2 + 1*3
//! 3*2
//! 3*1 + 1*3
//! 2*1 + 2*2
//! 4*1 + 1*2
//! 6*1
//! ```
//!
//! The walk restricted to `k` parts starts at `(k-1)*1 + 1*(n-k+1)` and ends
//! once the partition is as balanced as it can get.

use std::fmt;

/// A partition of a positive integer in multiplicity representation.
///
/// Index 0 of both buffers is a sentinel (`part = -1`, `mult = 1`) that stops
/// the backwards scan of the successor step.
#[derive(Debug, Clone)]
pub struct Partition {
    target: u32,
    /// Number of distinct parts; valid entries are `1..=distinct`.
    distinct: usize,
    mult: Vec<i64>,
    part: Vec<i64>,
}

impl Partition {
    /// The single-part partition `{n}`.
    fn single(n: u32) -> Self {
        let capacity = n as usize + 2;
        let mut p = Self::empty(n, capacity);
        p.part[1] = i64::from(n);
        p.mult[1] = 1;
        p.distinct = 1;
        p
    }

    /// The partition of `n` into exactly `k` parts with the largest possible
    /// largest part.
    fn first_with_parts(n: u32, k: u32) -> Self {
        // at most k distinct parts, plus the sentinel and one slot of headroom
        let capacity = k as usize + 2;
        let mut p = Self::empty(n, capacity);
        let max_part = i64::from(n - k + 1);
        if k == 1 || k == n {
            // the only partition: {n} or n*1
            p.part[1] = max_part;
            p.mult[1] = i64::from(n) / max_part;
            p.distinct = 1;
        } else {
            p.part[1] = 1;
            p.mult[1] = i64::from(k - 1);
            p.part[2] = max_part;
            p.mult[2] = 1;
            p.distinct = 2;
        }
        p
    }

    fn empty(n: u32, capacity: usize) -> Self {
        let mut mult = vec![0; capacity];
        let mut part = vec![0; capacity];
        mult[0] = 1;
        part[0] = -1;
        Self {
            target: n,
            distinct: 0,
            mult,
            part,
        }
    }

    /// The integer being partitioned.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Number of distinct part values.
    pub fn distinct_parts(&self) -> usize {
        self.distinct
    }

    /// Number of parts counted with multiplicity.
    pub fn part_count(&self) -> u32 {
        self.pairs().map(|(_, c)| c).sum()
    }

    /// `(part, multiplicity)` pairs in increasing order of part.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.part[1..=self.distinct]
            .iter()
            .zip(&self.mult[1..=self.distinct])
            .map(|(&y, &c)| (y as u32, c as u32))
    }

    /// Replace `self` by its successor in Algorithm Z order.
    ///
    /// Only valid when a successor exists; the generator checks that.
    fn advance(&mut self) {
        let c = &mut self.mult;
        let y = &mut self.part;
        let h = self.distinct;

        // collect the trailing parts within distance 1 of the largest part
        let mut i = h - 1;
        let mut k = c[h];
        let mut r = c[h] * y[h];
        while y[h] - y[i] < 2 {
            k += c[i];
            r += c[i] * y[i];
            i -= 1;
        }

        if c[i] == 1 {
            if i != 0 {
                r += c[i] * y[i];
                y[i] += 1;
            } else {
                i = 1;
                y[i] = 1;
            }
        } else {
            c[i] -= 1;
            r += y[i];
            i += 1;
            y[i] = y[i - 1] + 1;
        }

        // spend the collected parts at the current value, then the remainder
        c[i] = k;
        r -= c[i] * y[i];
        if r == y[i] {
            c[i] += 1;
            self.distinct = i;
        } else {
            self.distinct = i + 1;
            y[i + 1] = r;
            c[i + 1] = 1;
        }
    }
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.pairs().eq(other.pairs())
    }
}

impl Eq for Partition {}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (y, c)) in self.pairs().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{c}*{y}")?;
        }
        Ok(())
    }
}

/// Which partitions a [`PartitionGenerator`] walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Every partition of `n`.
    All,
    /// Only partitions of `n` into exactly this many parts.
    Parts(u32),
}

/// Lazy, single-pass walk over the partitions of an integer.
///
/// The generator owns the current partition and rewrites it in place on
/// [`advance`](Self::advance); borrow it through [`current`](Self::current).
/// To restart, build a new generator.
///
/// ```
/// use squares_core::PartitionGenerator;
///
/// let mut partitions = PartitionGenerator::with_parts(6, 3);
/// let mut seen = Vec::new();
/// while let Some(p) = partitions.current() {
///     seen.push(p.to_string());
///     partitions.advance();
/// }
/// assert_eq!(seen, ["2*1 + 1*4", "1*1 + 1*2 + 1*3", "3*2"]);
/// ```
#[derive(Debug, Clone)]
pub struct PartitionGenerator {
    partition: Partition,
    constraint: Constraint,
    done: bool,
}

impl PartitionGenerator {
    /// Walk every partition of `n`, starting at `{n}` and ending at `n*1`.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    pub fn new(n: u32) -> Self {
        assert!(n > 0, "cannot partition 0");
        Self {
            partition: Partition::single(n),
            constraint: Constraint::All,
            done: false,
        }
    }

    /// Walk the partitions of `n` into exactly `k` parts.
    ///
    /// # Panics
    /// Panics unless `1 <= k <= n`.
    pub fn with_parts(n: u32, k: u32) -> Self {
        assert!(n > 0, "cannot partition 0");
        assert!(
            (1..=n).contains(&k),
            "number of parts must be in 1..={n}, got {k}"
        );
        Self {
            partition: Partition::first_with_parts(n, k),
            constraint: Constraint::Parts(k),
            done: false,
        }
    }

    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    /// `true` once the last partition has been passed.
    pub fn is_exhausted(&self) -> bool {
        self.done
    }

    /// The current partition, or `None` when exhausted.
    pub fn current(&self) -> Option<&Partition> {
        (!self.done).then_some(&self.partition)
    }

    /// Move to the next partition, or mark the walk exhausted after the last.
    ///
    /// # Panics
    /// Panics if the generator is already exhausted.
    pub fn advance(&mut self) {
        assert!(!self.done, "advanced an exhausted partition generator");
        if self.is_final() {
            self.done = true;
        } else {
            self.partition.advance();
        }
    }

    fn is_final(&self) -> bool {
        let p = &self.partition;
        match self.constraint {
            Constraint::All => p.mult[1] == i64::from(p.target),
            Constraint::Parts(_) => p.part[p.distinct] - p.part[1] <= 1,
        }
    }
}

impl Iterator for PartitionGenerator {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        let p = self.current()?.clone();
        self.advance();
        Some(p)
    }
}

impl std::iter::FusedIterator for PartitionGenerator {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Number of partitions p(n) for n = 1..=20.
    const PARTITION_COUNTS: [usize; 20] = [
        1, 2, 3, 5, 7, 11, 15, 22, 30, 42, 56, 77, 101, 135, 176, 231, 297, 385, 490, 627,
    ];

    fn render(generator: PartitionGenerator) -> Vec<String> {
        generator.map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_all_partitions_of_six() {
        assert_eq!(
            render(PartitionGenerator::new(6)),
            [
                "1*6",
                "1*1 + 1*5",
                "1*2 + 1*4",
                "2*3",
                "2*1 + 1*4",
                "1*1 + 1*2 + 1*3",
                "3*2",
                "3*1 + 1*3",
                "2*1 + 2*2",
                "4*1 + 1*2",
                "6*1",
            ]
        );
    }

    #[test]
    fn test_six_into_three_parts() {
        assert_eq!(
            render(PartitionGenerator::with_parts(6, 3)),
            ["2*1 + 1*4", "1*1 + 1*2 + 1*3", "3*2"]
        );
    }

    #[test]
    fn test_multiplicity_view() {
        let mut generator = PartitionGenerator::new(6);
        for _ in 0..8 {
            generator.advance();
        }
        let p = generator.current().unwrap();
        assert_eq!(p.target(), 6);
        assert_eq!(p.distinct_parts(), 2);
        assert_eq!(p.pairs().collect::<Vec<_>>(), [(1, 2), (2, 2)]);
        assert_eq!(p.part_count(), 4);
    }

    #[test]
    fn test_single_partition_cases() {
        assert_eq!(render(PartitionGenerator::new(1)), ["1*1"]);
        assert_eq!(render(PartitionGenerator::with_parts(5, 1)), ["1*5"]);
        assert_eq!(render(PartitionGenerator::with_parts(5, 5)), ["5*1"]);
        assert_eq!(render(PartitionGenerator::with_parts(5, 4)), ["3*1 + 1*2"]);
    }

    #[test]
    fn test_known_partition_counts() {
        for (n, &count) in (1..=20).zip(PARTITION_COUNTS.iter()) {
            assert_eq!(PartitionGenerator::new(n).count(), count, "p({n})");
        }
    }

    #[test]
    fn test_exhaustion() {
        let mut generator = PartitionGenerator::with_parts(4, 2);
        assert!(!generator.is_exhausted());
        generator.advance();
        generator.advance();
        assert!(generator.is_exhausted());
        assert!(generator.current().is_none());
        assert!(generator.next().is_none());
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn test_advance_past_end_panics() {
        let mut generator = PartitionGenerator::new(1);
        generator.advance();
        generator.advance();
    }

    #[test]
    #[should_panic(expected = "number of parts")]
    fn test_too_many_parts_panics() {
        PartitionGenerator::with_parts(3, 4);
    }

    proptest! {
        #[test]
        fn prop_partitions_are_valid_and_distinct(n in 1u32..=24) {
            let all: Vec<Partition> = PartitionGenerator::new(n).collect();
            for p in &all {
                prop_assert_eq!(p.pairs().map(|(y, c)| y * c).sum::<u32>(), n);
                let parts: Vec<u32> = p.pairs().map(|(y, _)| y).collect();
                prop_assert!(parts.windows(2).all(|w| w[0] < w[1]), "{}", p);
                prop_assert!(p.pairs().all(|(y, c)| y >= 1 && c >= 1));
            }
            let mut rendered: Vec<String> = all.iter().map(|p| p.to_string()).collect();
            rendered.sort();
            rendered.dedup();
            prop_assert_eq!(rendered.len(), all.len());
        }

        #[test]
        fn prop_k_constrained_walks_cover_all_partitions(n in 1u32..=24) {
            let mut total = 0;
            for k in 1..=n {
                for p in PartitionGenerator::with_parts(n, k) {
                    prop_assert_eq!(p.part_count(), k);
                    prop_assert_eq!(p.pairs().map(|(y, c)| y * c).sum::<u32>(), n);
                    total += 1;
                }
            }
            prop_assert_eq!(total, PartitionGenerator::new(n).count());
        }
    }
}
