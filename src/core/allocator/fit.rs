//! The four fit strategies

use super::Placement;
use crate::extent::Extent;

/// First extent, in address order, that fits
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl Placement for FirstFit {
    fn select(&self, free: &[Extent], size: u64, _cursor: u64) -> Option<usize> {
        free.iter().position(|extent| extent.length >= size)
    }
}

/// Extent leaving the smallest leftover
///
/// Only a strictly smaller leftover replaces the current best, so ties go to
/// the lowest address.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl Placement for BestFit {
    fn select(&self, free: &[Extent], size: u64, _cursor: u64) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;

        for (idx, extent) in free.iter().enumerate() {
            if extent.length < size {
                continue;
            }
            let leftover = extent.length - size;
            if best.map_or(true, |(_, min)| leftover < min) {
                best = Some((idx, leftover));
            }
        }

        best.map(|(idx, _)| idx)
    }
}

/// Largest extent that fits
///
/// Only a strictly larger extent replaces the current choice, so ties go to
/// the lowest address.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstFit;

impl Placement for WorstFit {
    fn select(&self, free: &[Extent], size: u64, _cursor: u64) -> Option<usize> {
        let mut worst: Option<(usize, u64)> = None;

        for (idx, extent) in free.iter().enumerate() {
            if extent.length >= size && worst.map_or(true, |(_, max)| extent.length > max) {
                worst = Some((idx, extent.length));
            }
        }

        worst.map(|(idx, _)| idx)
    }
}

/// Circular first fit anchored at the cursor
///
/// The scan starts at the first extent whose start is at or after the
/// cursor (the beginning if there is none), runs to the end, then wraps
/// around and stops just before the starting index.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextFit;

impl Placement for NextFit {
    fn select(&self, free: &[Extent], size: u64, cursor: u64) -> Option<usize> {
        let origin = free
            .iter()
            .position(|extent| extent.start >= cursor)
            .unwrap_or(0);

        (origin..free.len())
            .chain(0..origin)
            .find(|&idx| free[idx].length >= size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holes() -> Vec<Extent> {
        // 300 @ 0, 100 @ 400, 500 @ 600, 100 @ 1200, 500 @ 1400
        vec![
            Extent::new(0, 300),
            Extent::new(400, 100),
            Extent::new(600, 500),
            Extent::new(1200, 100),
            Extent::new(1400, 500),
        ]
    }

    #[test]
    fn test_first_fit() {
        let free = holes();
        assert_eq!(FirstFit.select(&free, 50, 0), Some(0));
        assert_eq!(FirstFit.select(&free, 400, 0), Some(2));
        assert_eq!(FirstFit.select(&free, 501, 0), None);
    }

    #[test]
    fn test_first_fit_ignores_cursor() {
        let free = holes();
        assert_eq!(FirstFit.select(&free, 50, 1300), Some(0));
    }

    #[test]
    fn test_best_fit_prefers_tightest() {
        let free = holes();
        assert_eq!(BestFit.select(&free, 250, 0), Some(0));
        assert_eq!(BestFit.select(&free, 350, 0), Some(2));
    }

    #[test]
    fn test_best_fit_tie_goes_to_lowest_address() {
        let free = holes();
        // 100 @ 400 and 100 @ 1200 both leave 0
        assert_eq!(BestFit.select(&free, 100, 0), Some(1));
        // 500 @ 600 and 500 @ 1400 both leave 50
        assert_eq!(BestFit.select(&free, 450, 0), Some(2));
    }

    #[test]
    fn test_best_fit_exact_match_wins() {
        let free = vec![Extent::new(0, 1000), Extent::new(2000, 64)];
        assert_eq!(BestFit.select(&free, 64, 0), Some(1));
    }

    #[test]
    fn test_worst_fit_tie_goes_to_lowest_address() {
        let free = holes();
        assert_eq!(WorstFit.select(&free, 10, 0), Some(2));
        assert_eq!(WorstFit.select(&free, 600, 0), None);
    }

    #[test]
    fn test_next_fit_starts_at_cursor() {
        let free = holes();
        assert_eq!(NextFit.select(&free, 50, 0), Some(0));
        assert_eq!(NextFit.select(&free, 50, 300), Some(1));
        assert_eq!(NextFit.select(&free, 50, 400), Some(1));
        assert_eq!(NextFit.select(&free, 50, 401), Some(2));
        assert_eq!(NextFit.select(&free, 200, 401), Some(2));
    }

    #[test]
    fn test_next_fit_wraps_around() {
        // Second hole is 60 units so an 80-unit request fits only the hole at 0
        let free = vec![Extent::new(0, 100), Extent::new(500, 60)];
        assert_eq!(NextFit.select(&free, 80, 550), Some(0));
        // Scan begins at the hole at 500, which is too small
        assert_eq!(NextFit.select(&free, 80, 450), Some(0));
        assert_eq!(NextFit.select(&free, 60, 450), Some(1));
    }

    #[test]
    fn test_next_fit_cursor_past_every_extent() {
        let free = holes();
        // No extent starts at or after 5000, so the scan begins at index 0
        assert_eq!(NextFit.select(&free, 400, 5000), Some(2));
    }

    #[test]
    fn test_next_fit_wrap_excludes_nothing_it_already_saw() {
        let free = holes();
        assert_eq!(NextFit.select(&free, 300, 1300), Some(4));
        assert_eq!(NextFit.select(&free, 501, 1300), None);
    }

    #[test]
    fn test_empty_free_list() {
        let free: Vec<Extent> = Vec::new();
        assert_eq!(FirstFit.select(&free, 1, 0), None);
        assert_eq!(BestFit.select(&free, 1, 0), None);
        assert_eq!(WorstFit.select(&free, 1, 0), None);
        assert_eq!(NextFit.select(&free, 1, 0), None);
    }
}
