//! Levenshtein edit distance
//!
//! Distances are computed over slices of any comparable symbol type, so
//! single-character codes and short categorical strings are handled alike.
//! Insertions, deletions and substitutions all cost one.

use std::fmt;

/// Minimum number of single-symbol edits turning `a` into `b`.
///
/// Runs in O(|a|·|b|) time, keeping two rows of the table at a time.
pub fn distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, sa) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sb) in b.iter().enumerate() {
            curr[j + 1] = if sa == sb {
                prev[j]
            } else {
                1 + prev[j + 1].min(curr[j]).min(prev[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// The full (|a|+1) × (|b|+1) dynamic programming table, kept for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    a: Vec<String>,
    b: Vec<String>,
    /// `cells[i][j]` is the distance between `a[..i]` and `b[..j]`
    cells: Vec<Vec<usize>>,
}

impl DistanceTable {
    pub fn compute<T: PartialEq + fmt::Display>(a: &[T], b: &[T]) -> Self {
        let mut cells = vec![vec![0; b.len() + 1]; a.len() + 1];

        for (i, row) in cells.iter_mut().enumerate() {
            row[0] = i;
        }
        for (j, cell) in cells[0].iter_mut().enumerate() {
            *cell = j;
        }

        for i in 1..=a.len() {
            for j in 1..=b.len() {
                cells[i][j] = if a[i - 1] == b[j - 1] {
                    cells[i - 1][j - 1]
                } else {
                    1 + cells[i - 1][j]
                        .min(cells[i][j - 1])
                        .min(cells[i - 1][j - 1])
                };
            }
        }

        Self {
            a: a.iter().map(ToString::to_string).collect(),
            b: b.iter().map(ToString::to_string).collect(),
            cells,
        }
    }

    pub fn distance(&self) -> usize {
        self.cells[self.a.len()][self.b.len()]
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<usize> {
        self.cells.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.cells
    }
}

impl fmt::Display for DistanceTable {
    /// Symbols of `b` label the rows, symbols of `a` label the columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .a
            .iter()
            .chain(self.b.iter())
            .map(|s| s.chars().count())
            .chain(self.cells.iter().flatten().map(|v| v.to_string().len()))
            .max()
            .unwrap_or(1);

        write!(f, "{:>w$}  {:>w$}", "", "", w = width)?;
        for sym in &self.a {
            write!(f, "  {:>w$}", sym, w = width)?;
        }
        writeln!(f)?;

        for j in 0..=self.b.len() {
            let label = if j == 0 { "" } else { self.b[j - 1].as_str() };
            write!(f, "{:>w$}", label, w = width)?;
            for i in 0..=self.a.len() {
                write!(f, "  {:>w$}", self.cells[i][j], w = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syms(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    /// Every sequence over {A, B, C} up to the given length
    fn all_sequences(max_len: usize) -> Vec<Vec<char>> {
        let mut out = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for seq in &frontier {
                for c in ['A', 'B', 'C'] {
                    let mut s: Vec<char> = seq.clone();
                    s.push(c);
                    next.push(s);
                }
            }
            out.extend(next.iter().cloned());
            frontier = next;
        }
        out
    }

    #[test]
    fn test_empty() {
        assert_eq!(distance::<char>(&[], &[]), 0);
        assert_eq!(distance(&[], &syms("abc")), 3);
        assert_eq!(distance(&syms("abc"), &[]), 3);
    }

    #[test]
    fn test_known_distances() {
        assert_eq!(distance(&syms("kitten"), &syms("sitting")), 3);
        assert_eq!(distance(&syms("sunday"), &syms("saturday")), 3);
        assert_eq!(distance(&syms("flaw"), &syms("lawn")), 2);
        assert_eq!(distance(&syms("AA"), &syms("AB")), 1);
        assert_eq!(distance(&syms("BA"), &syms("AB")), 2);
    }

    #[test]
    fn test_string_symbols() {
        let a = vec!["hi".to_string(), "lo".to_string(), "hi".to_string()];
        let b = vec!["hi".to_string(), "hi".to_string()];
        assert_eq!(distance(&a, &b), 1);
        // Multi-character codes compare whole, never per character
        let c = vec!["hl".to_string(), "lo".to_string(), "hi".to_string()];
        assert_eq!(distance(&a, &c), 1);
    }

    #[test]
    fn test_metric_properties() {
        let seqs = all_sequences(4);
        for a in &seqs {
            assert_eq!(distance(a, a), 0);
            for b in &seqs {
                let ab = distance(a, b);
                assert_eq!(ab, distance(b, a), "symmetry {:?} {:?}", a, b);
                assert!(ab <= a.len().max(b.len()));
                assert_eq!(ab == 0, a == b);
            }
        }
    }

    #[test]
    fn test_triangle_inequality() {
        let seqs = all_sequences(3);
        for a in &seqs {
            for b in &seqs {
                let ab = distance(a, b);
                for c in &seqs {
                    assert!(
                        distance(a, c) <= ab + distance(b, c),
                        "triangle {:?} {:?} {:?}",
                        a,
                        b,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_table_matches_rolling_rows() {
        let seqs = all_sequences(4);
        for a in seqs.iter().step_by(7) {
            for b in seqs.iter().step_by(5) {
                assert_eq!(DistanceTable::compute(a, b).distance(), distance(a, b));
            }
        }
    }

    #[test]
    fn test_table_ramps() {
        let table = DistanceTable::compute(&syms("AB"), &syms("ABC"));
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[0], vec![0, 1, 2, 3]);
        assert_eq!(table.cell(2, 0), Some(2));
        assert_eq!(table.cell(3, 0), None);
        assert_eq!(table.distance(), 1);
    }

    #[test]
    fn test_table_rendering() {
        let table = DistanceTable::compute(&syms("AB"), &syms("B"));
        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "      A  B");
        assert_eq!(lines[1], "   0  1  2");
        assert_eq!(lines[2], "B  1  1  1");
    }
}
