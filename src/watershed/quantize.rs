use super::{BinIndex, EnhancedWatershed};
use crate::im::{GridIm, Im};

/// Quantized value for pixels below the minimum threshold.
pub(crate) const EXCLUDED: i32 = -1;

impl EnhancedWatershed {
    /// Quantize a field into discrete bins.
    ///
    /// Returns the per-bin pixel index and the quantized grid. Pixels below
    /// `min_thresh` quantize to -1 and appear in no bin; levels above
    /// `max_bin` clamp into the top bin. The bin index is filled in row-major
    /// scan order, which fixes the downstream seed tie-break order.
    pub fn quantize(&self, grid: &GridIm) -> (BinIndex, Im<i32, 1>) {
        assert!(
            self.max_bin() >= 0,
            "degenerate thresholds: max_thresh < min_thresh"
        );

        let max_bin = self.max_bin();
        let mut bins: BinIndex = vec![Vec::new(); (max_bin + 1) as usize];
        let mut q_data = Im::<i32, 1>::filled(grid.w, grid.h, EXCLUDED);

        for y in 0..grid.h {
            for x in 0..grid.w {
                // Truncate-to-int first, then floor division by the step.
                let raw = grid.at(x, y) as i32;
                let mut level = (raw - self.min_thresh).div_euclid(self.data_increment);

                // With a zero minimum, the zero bin is background too.
                let excluded = if self.min_thresh == 0 {
                    level <= 0
                } else {
                    level < 0
                };
                if excluded {
                    continue;
                }

                if level > max_bin {
                    level = max_bin;
                }
                q_data.set(x, y, level);
                bins[level as usize].push((x, y));
            }
        }

        (bins, q_data)
    }
}

// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_bins_and_clamps() {
        let ws = EnhancedWatershed::new(10, 30, 100, 4.0, 5);
        assert_eq!(ws.max_bin(), 4);

        let grid = GridIm {
            w: 5,
            h: 1,
            s: 5,
            arr: vec![3.0, 10.0, 14.9, 25.0, 99.0],
        };
        let (bins, q) = ws.quantize(&grid);

        // 3 -> below threshold, 10 and 14.9 -> bin 0, 25 -> bin 3, 99 -> clamped to 4.
        assert_eq!(q.arr, vec![-1, 0, 0, 3, 4]);
        assert_eq!(bins[0], vec![(1, 0), (2, 0)]);
        assert_eq!(bins[3], vec![(3, 0)]);
        assert_eq!(bins[4], vec![(4, 0)]);
        assert!(bins[1].is_empty() && bins[2].is_empty());
    }

    #[test]
    fn zero_min_thresh_excludes_the_zero_bin() {
        let ws = EnhancedWatershed::new(0, 5, 100, 4.0, 1);
        let grid = GridIm {
            w: 3,
            h: 1,
            s: 3,
            arr: vec![0.0, 0.9, 1.0],
        };
        let (bins, q) = ws.quantize(&grid);
        // Levels 0 are excluded when min_thresh == 0; 1.0 lands in bin 1.
        assert_eq!(q.arr, vec![-1, -1, 1]);
        assert!(bins[0].is_empty());
        assert_eq!(bins[1], vec![(2, 0)]);
    }

    #[test]
    fn negative_values_floor_divide_below_threshold() {
        let ws = EnhancedWatershed::new(2, 9, 100, 4.0, 2);
        let grid = GridIm {
            w: 3,
            h: 1,
            s: 3,
            arr: vec![1.0, 0.0, -5.0],
        };
        let (_, q) = ws.quantize(&grid);
        assert_eq!(q.arr, vec![-1, -1, -1]);
    }

    #[test]
    fn quantize_is_idempotent_in_output() {
        let ws = EnhancedWatershed::new(2, 9, 50, 4.0, 1);
        let grid = GridIm::from_fn(7, 5, |x, y| ((x * y) % 10) as f32);
        let (bins_a, q_a) = ws.quantize(&grid);
        let (bins_b, q_b) = ws.quantize(&grid);
        assert_eq!(bins_a, bins_b);
        assert_eq!(q_a, q_b);
    }

    #[test]
    fn bin_index_is_row_major_scan_order() {
        let ws = EnhancedWatershed::new(1, 4, 100, 4.0, 1);
        let grid = GridIm {
            w: 2,
            h: 2,
            s: 2,
            arr: vec![2.0, 2.0, 2.0, 2.0],
        };
        let (bins, _) = ws.quantize(&grid);
        assert_eq!(bins[1], vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }
}
