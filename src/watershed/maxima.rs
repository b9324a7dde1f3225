use super::{BinIndex, EnhancedWatershed};
use crate::im::Im;

/// Claim-map value for cells no center has claimed yet.
const UNCLAIMED: i32 = -1;

impl EnhancedWatershed {
    /// Pick local-maximum seed centers, one exclusion square at a time.
    ///
    /// Bins are walked from high to low: the strongest pixels claim their
    /// neighborhoods first, so a weak maximum can never pre-empt a stronger
    /// one. The exclusion half-width shrinks with bin intensity, letting weak
    /// maxima sit closer together than strong ones.
    ///
    /// The claim map here is scratch state; region growing starts from a
    /// fresh grid.
    pub(crate) fn find_local_maxima(&self, q_data: &Im<i32, 1>, bins: &BinIndex) -> BinIndex {
        let mut centers: BinIndex = vec![Vec::new(); bins.len()];
        let mut claim = Im::<i32, 1>::filled(q_data.w, q_data.h, UNCLAIMED);

        let min_infl = (1.0 + 0.5 * self.dist_btw_objects.sqrt()).round() as usize;
        let max_infl = 2 * min_infl;
        let max_bin = self.max_bin();

        let mut claimed_so_far: Vec<(usize, usize)> = Vec::new();

        for b in (0..bins.len()).rev() {
            let infl = if max_bin > 0 {
                min_infl
                    + ((b as f64 / max_bin as f64) * (max_infl - min_infl) as f64).round() as usize
            } else {
                min_infl
            };

            for &(px, py) in &bins[b] {
                if claim.at(px, py) != UNCLAIMED {
                    continue;
                }

                // Tentatively claim the square around (px, py), clipped to the
                // grid. Any cell already claimed by a stronger (or earlier)
                // center aborts the claim; the tentative marks are reverted.
                let x0 = px.saturating_sub(infl);
                let y0 = py.saturating_sub(infl);
                let x1 = (px + infl).min(q_data.w - 1);
                let y1 = (py + infl).min(q_data.h - 1);

                claimed_so_far.clear();
                let mut ok = false;
                'claim: for y in y0..=y1 {
                    for x in x0..=x1 {
                        if claim.at(x, y) == UNCLAIMED {
                            ok = true;
                            claim.set(x, y, b as i32);
                            claimed_so_far.push((x, y));
                        } else {
                            // Neighborhood already taken.
                            ok = false;
                            break 'claim;
                        }
                    }
                }

                if ok {
                    // Highest point in its neighborhood.
                    centers[b].push((px, py));
                } else {
                    for &(x, y) in &claimed_so_far {
                        claim.set(x, y, UNCLAIMED);
                    }
                }
            }
        }

        centers
    }
}

// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::grid_from_ascii;

    fn centers_flat(centers: &BinIndex) -> Vec<(usize, (usize, usize))> {
        let mut out = Vec::new();
        for b in (0..centers.len()).rev() {
            for &c in &centers[b] {
                out.push((b, c));
            }
        }
        out
    }

    #[test]
    fn single_peak_yields_single_center_at_its_bin() {
        let ws = EnhancedWatershed::new(2, 9, 100, 4.0, 1);
        let grid = grid_from_ascii(
            r#"
                0000000000
                0023332000
                0024542000
                0023332000
                0000000000
            "#,
        );
        let (bins, q) = ws.quantize(&grid);
        let centers = ws.find_local_maxima(&q, &bins);

        let flat = centers_flat(&centers);
        assert_eq!(flat, vec![(3, (4, 2))]);
    }

    #[test]
    fn stronger_peak_excludes_weaker_one_inside_its_square() {
        // Second (weaker) maximum sits inside the first one's exclusion
        // square, so it never becomes a center.
        let ws = EnhancedWatershed::new(2, 9, 100, 4.0, 1);
        let grid = grid_from_ascii(
            r#"
                000000000
                002355300
                002343200
                000000000
            "#,
        );
        let (bins, q) = ws.quantize(&grid);
        let centers = ws.find_local_maxima(&q, &bins);

        let flat = centers_flat(&centers);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].0, 3);
    }

    #[test]
    fn equal_peaks_tie_break_in_scan_order() {
        let ws = EnhancedWatershed::new(2, 9, 100, 4.0, 1);
        let grid = grid_from_ascii(
            r#"
                0000000
                0505050
                0000000
            "#,
        );
        let (bins, q) = ws.quantize(&grid);
        let centers = ws.find_local_maxima(&q, &bins);

        // min_infl = 2, bin 3 of 7 -> infl 3: (1,1) claims x0..=4, so (3,1)
        // conflicts; (5,1)'s square overlaps the claim as well.
        assert_eq!(centers[3], vec![(1, 1)]);
    }

    #[test]
    fn distant_equal_peaks_both_become_centers() {
        let ws = EnhancedWatershed::new(2, 9, 100, 4.0, 1);
        let mut grid = crate::im::GridIm::new(20, 5);
        grid.set(2, 2, 5.0);
        grid.set(17, 2, 5.0);

        let (bins, q) = ws.quantize(&grid);
        let centers = ws.find_local_maxima(&q, &bins);
        assert_eq!(centers[3], vec![(2, 2), (17, 2)]);
    }

    #[test]
    fn claims_clip_at_grid_edges() {
        // A peak in the corner must not panic and still claims what fits.
        let ws = EnhancedWatershed::new(2, 9, 100, 4.0, 1);
        let mut grid = crate::im::GridIm::new(4, 4);
        grid.set(0, 0, 9.0);

        let (bins, q) = ws.quantize(&grid);
        let centers = ws.find_local_maxima(&q, &bins);
        assert_eq!(centers[7], vec![(0, 0)]);
    }
}
