//! Index combinations, e.g. every pair of learners to compare.

/// All `r`-element combinations of `0..n` in lexicographic order.
///
/// The iterator is `Clone`, so a fresh copy restarts the sequence.
pub fn combinations(n: usize, r: usize) -> Combinations {
    Combinations {
        n,
        indices: (0..r).collect(),
        done: r > n,
    }
}

/// Every unordered pair `(i, j)` with `i < j < n`.
pub fn pairs(n: usize) -> impl Iterator<Item = (usize, usize)> + Clone {
    combinations(n, 2).map(|c| (c[0], c[1]))
}

/// Pairs over the historical default of 24 learners.
pub fn get_all_pairs() -> Vec<(usize, usize)> {
    pairs(24).collect()
}

#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // advance: find the rightmost index that can still move up
        let r = self.indices.len();
        match (0..r).rev().find(|&i| self.indices[i] < self.n - r + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..r {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_choose_two() {
        let got: Vec<_> = pairs(4).collect();
        assert_eq!(got, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn triples_are_lexicographic() {
        let got: Vec<_> = combinations(4, 3).collect();
        assert_eq!(
            got,
            vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3], vec![1, 2, 3]]
        );
    }

    #[test]
    fn edge_arities() {
        assert_eq!(combinations(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(combinations(0, 0).count(), 1);
        assert_eq!(combinations(2, 3).count(), 0);
        assert_eq!(combinations(5, 5).collect::<Vec<_>>(), vec![vec![0, 1, 2, 3, 4]]);
        assert_eq!(pairs(1).count(), 0);
    }

    #[test]
    fn restartable_by_clone() {
        let it = pairs(5);
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn default_pairs_cover_24_learners() {
        let all = get_all_pairs();
        assert_eq!(all.len(), 24 * 23 / 2);
        assert_eq!(all.first(), Some(&(0, 1)));
        assert_eq!(all.last(), Some(&(22, 23)));
    }
}
