use super::{BinIndex, Cell, EnhancedWatershed, Foothill};
use crate::im::Im;

#[inline]
fn dist2(a: (usize, usize), b: (usize, usize)) -> i64 {
    let dx = a.0 as i64 - b.0 as i64;
    let dy = a.1 as i64 - b.1 as i64;
    dx * dx + dy * dy
}

impl EnhancedWatershed {
    /// Absorb the queued foothill fringes into the globbed state so later
    /// levels never seed or grow into them. Runs a descending flood from each
    /// record's candidates: a neighbor joins if it continues the downhill
    /// gradient, or if its own nearest recorded center is the record's center
    /// (the tie-break lets a region keep fringe that clearly belongs to it).
    /// Drains the foothill list.
    pub(crate) fn remove_foothills(
        &self,
        q_data: &Im<i32, 1>,
        marked: &mut Im<Cell, 1>,
        bin_num: i32,
        bin_lower: i32,
        centers: &BinIndex,
        foothills: &mut Vec<Foothill>,
    ) {
        for foot in foothills.drain(..) {
            let center = foot.center;
            let mut hills = foot.globs;

            while let Some((px, py)) = hills.pop() {
                marked.set(px, py, Cell::Globbed);

                let x0 = px.saturating_sub(1);
                let y0 = py.saturating_sub(1);
                let x1 = (px + 1).min(q_data.w - 1);
                let y1 = (py + 1).min(q_data.h - 1);
                let level_here = q_data.at(px, py);

                for ny in y0..=y1 {
                    for nx in x0..=x1 {
                        if marked.at(nx, ny) != Cell::Unmarked {
                            continue;
                        }
                        let level = q_data.at(nx, ny);
                        // Descending gradient spreads freely; flat or rising
                        // fringe only joins when this record's center is the
                        // nearest one. Minor peaks get let in either way.
                        if level >= 0
                            && level < bin_lower
                            && (level <= level_here
                                || Self::is_closest((nx, ny), center, centers, bin_num))
                        {
                            hills.push((nx, ny));
                        }
                    }
                }
            }
        }
    }

    /// True when no recorded center in bins `bin_num / 2` and up is strictly
    /// closer to `point` than `center` is (squared Euclidean distance).
    fn is_closest(
        point: (usize, usize),
        center: (usize, usize),
        centers: &BinIndex,
        bin_num: i32,
    ) -> bool {
        let bin_thresh = (bin_num / 2).max(0) as usize;
        let my_dist = dist2(point, center);
        for bin in centers.iter().skip(bin_thresh) {
            for &other in bin {
                if dist2(point, other) < my_dist {
                    return false;
                }
            }
        }
        true
    }
}

// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::im::GridIm;

    #[test]
    fn is_closest_compares_against_higher_bin_centers_only() {
        // centers: bin 0 holds a very close center, bin 2 a distant one.
        let centers: BinIndex = vec![vec![(1, 0)], vec![], vec![(9, 0)], vec![]];

        // bin_num 4 -> threshold bin 2: the close bin-0 center is ignored.
        assert!(EnhancedWatershed::is_closest((0, 0), (3, 0), &centers, 4));
        // bin_num 0 -> all bins count: the bin-0 center at distance 1 wins
        // over our center at distance 3.
        assert!(!EnhancedWatershed::is_closest((0, 0), (3, 0), &centers, 0));
    }

    #[test]
    fn own_center_never_disqualifies_itself() {
        let centers: BinIndex = vec![vec![(2, 2)]];
        // Distance to (2,2) equals my_dist; only *strictly* closer rejects.
        assert!(EnhancedWatershed::is_closest((4, 2), (2, 2), &centers, 0));
    }

    #[test]
    fn foothill_flood_descends_gradient_and_stops_at_floor() {
        let ws = EnhancedWatershed::new(1, 8, 100, 4.0, 1);
        // q levels: a little downhill run 3,2,1 then uphill 5 at the end.
        let grid = GridIm {
            w: 6,
            h: 1,
            s: 6,
            arr: vec![0.0, 4.0, 3.0, 2.0, 6.0, 0.0],
        };
        let (_, q) = ws.quantize(&grid);
        let mut marked = Im::<Cell, 1>::new(6, 1);
        // Pretend (4,0) belongs to a captured region.
        marked.set(4, 0, Cell::Object(1));

        let centers: BinIndex = vec![Vec::new(); 8];
        let mut foothills = vec![Foothill {
            center: (4, 0),
            globs: vec![(3, 0)],
        }];

        // bin_lower 4: levels 3,2,1 all qualify, and with no competing
        // centers recorded the tie-break lets the uphill steps join too.
        ws.remove_foothills(&q, &mut marked, 5, 4, &centers, &mut foothills);
        assert!(foothills.is_empty());
        assert_eq!(marked.at(3, 0), Cell::Globbed);
        assert_eq!(marked.at(2, 0), Cell::Globbed);
        assert_eq!(marked.at(1, 0), Cell::Globbed);
        // Below-threshold cell never joins.
        assert_eq!(marked.at(0, 0), Cell::Unmarked);
        // The captured pixel is untouched.
        assert_eq!(marked.at(4, 0), Cell::Object(1));
    }

    #[test]
    fn rising_fringe_needs_the_tie_break() {
        let ws = EnhancedWatershed::new(1, 8, 100, 4.0, 1);
        // Level dips then rises: 1 then 2. The rise only globs when our
        // center is nearest.
        let grid = GridIm {
            w: 5,
            h: 1,
            s: 5,
            arr: vec![0.0, 3.0, 2.0, 3.0, 0.0],
        };
        let (_, q) = ws.quantize(&grid);

        // A competing center right next to the rising pixel.
        let mut centers: BinIndex = vec![Vec::new(); 8];
        centers[7] = vec![(4, 0)];

        let mut marked = Im::<Cell, 1>::new(5, 1);
        let mut foothills = vec![Foothill {
            center: (0, 0),
            globs: vec![(2, 0)],
        }];
        ws.remove_foothills(&q, &mut marked, 6, 3, &centers, &mut foothills);

        assert_eq!(marked.at(2, 0), Cell::Globbed);
        // (1,0) rises from the popped level but sits next to our center
        // (dist 1 vs 9 to the competitor), so the tie-break lets it glob.
        assert_eq!(marked.at(1, 0), Cell::Globbed);
        // (3,0) rises too, but the competing center at (4,0) is strictly
        // closer, so it stays unmarked.
        assert_eq!(marked.at(3, 0), Cell::Unmarked);
    }
}
