//! Sliding windows over symbol sequences

use std::num::NonZeroUsize;

/// Contiguous windows of a fixed length over a sequence.
///
/// Yields `max(0, N - L + 1)` windows; a window longer than the sequence
/// yields nothing. A clone walks the same remaining windows independently.
#[derive(Debug, Clone)]
pub struct SlidingWindows<'a, T> {
    seq: &'a [T],
    len: usize,
    pos: usize,
}

/// Windows of length `len` over `seq`, in order of starting position
pub fn sliding_windows<T>(seq: &[T], len: NonZeroUsize) -> SlidingWindows<'_, T> {
    SlidingWindows {
        seq,
        len: len.get(),
        pos: 0,
    }
}

/// Number of windows of length `len` over a sequence of length `n`
pub fn window_count(n: usize, len: NonZeroUsize) -> usize {
    (n + 1).saturating_sub(len.get())
}

impl<'a, T> Iterator for SlidingWindows<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.pos + self.len;
        if end > self.seq.len() {
            return None;
        }
        let window = &self.seq[self.pos..end];
        self.pos += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.seq.len() + 1).saturating_sub(self.pos + self.len);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SlidingWindows<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_windows_in_order() {
        let seq: Vec<char> = "AABAB".chars().collect();
        let windows: Vec<String> = sliding_windows(&seq, nz(2))
            .map(|w| w.iter().collect())
            .collect();
        assert_eq!(windows, vec!["AA", "AB", "BA", "AB"]);
    }

    #[test]
    fn test_window_counts() {
        for n in 0..8 {
            let seq = vec![0u8; n];
            for l in 1..10 {
                let windows: Vec<&[u8]> = sliding_windows(&seq, nz(l)).collect();
                let expected = if l > n { 0 } else { n - l + 1 };
                assert_eq!(windows.len(), expected, "n={} l={}", n, l);
                assert_eq!(window_count(n, nz(l)), expected);
                assert!(windows.iter().all(|w| w.len() == l));
            }
        }
    }

    #[test]
    fn test_window_longer_than_sequence() {
        let seq = ['A', 'B'];
        let mut windows = sliding_windows(&seq, nz(3));
        assert_eq!(windows.len(), 0);
        assert!(windows.next().is_none());
    }

    #[test]
    fn test_exact_size_and_restart() {
        let seq = [1, 2, 3, 4];
        let mut windows = sliding_windows(&seq, nz(2));
        assert_eq!(windows.len(), 3);
        windows.next();
        assert_eq!(windows.len(), 2);

        let restart = windows.clone();
        assert_eq!(windows.collect::<Vec<_>>(), restart.collect::<Vec<_>>());
    }
}
