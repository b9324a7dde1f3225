use super::{BinIndex, Cell, EnhancedWatershed, Foothill};
use crate::im::Im;

impl EnhancedWatershed {
    /// Grow regions from the seed centers, one bin level at a time from the
    /// highest down. Seeds that cannot decide capture-vs-reject at their level
    /// are deferred one level lower and retried ahead of the next level's new
    /// centers. Foothill absorption runs after all seeds of a level so it
    /// never competes with active growth.
    pub(crate) fn grow_centers(&self, centers: &BinIndex, q_data: &Im<i32, 1>) -> Im<Cell, 1> {
        let mut marked = Im::<Cell, 1>::new(q_data.w, q_data.h);
        let mut deferred_from_last: Vec<(usize, usize)> = Vec::new();
        let mut deferred_to_next: Vec<(usize, usize)> = Vec::new();
        let mut foothills: Vec<Foothill> = Vec::new();
        let mut capture_index: i32 = 1;

        for b in (0..centers.len()).rev() {
            let bin_lower = b.saturating_sub(1) as i32;

            std::mem::swap(&mut deferred_from_last, &mut deferred_to_next);
            deferred_to_next.clear();

            // Deferred seeds keep their original order and go first.
            for &center in deferred_from_last.iter().chain(centers[b].iter()) {
                let (cx, cy) = center;
                if marked.at(cx, cy) != Cell::Unmarked {
                    continue;
                }
                let captured = self.set_maximum(
                    q_data,
                    &mut marked,
                    center,
                    bin_lower,
                    &mut foothills,
                    capture_index,
                );
                if captured {
                    capture_index += 1;
                } else {
                    // Retry one intensity level lower to see if it gets big enough.
                    deferred_to_next.push(center);
                }
            }

            self.remove_foothills(q_data, &mut marked, b as i32, bin_lower, centers, &mut foothills);
        }

        marked
    }

    /// Grow one region from `center` down to the intensity floor `bin_lower`
    /// and decide its fate.
    ///
    /// Returns true when the region is finished growing: it reached the size
    /// cap (captured as-is, fringe queued as foothills), stopped with nothing
    /// below it left to gain, or came in at or under `min_size` (rolled back
    /// and discarded, but still "finished"). Returns false only when the seed
    /// must be retried one level lower; in that case every tentative mark has
    /// been rolled back.
    fn set_maximum(
        &self,
        q_data: &Im<i32, 1>,
        marked: &mut Im<Cell, 1>,
        center: (usize, usize),
        bin_lower: i32,
        foothills: &mut Vec<Foothill>,
        capture_index: i32,
    ) -> bool {
        let mut as_bin: Vec<(usize, usize)> = vec![center]; // pixels to include in the peak
        let mut as_glob: Vec<(usize, usize)> = Vec::new(); // foothill candidates
        let mut marked_so_far: Vec<(usize, usize)> = Vec::new(); // transaction log
        let mut will_be_considered_again = false;

        let center_level = q_data.at(center.0, center.1);

        while let Some((px, py)) = as_bin.pop() {
            if marked.at(px, py) != Cell::Unmarked {
                // Already swept up earlier in this same flood.
                continue;
            }
            marked.set(px, py, Cell::Object(capture_index));
            marked_so_far.push((px, py));

            // Check the 8-connected neighborhood, clipped at the edges.
            let x0 = px.saturating_sub(1);
            let y0 = py.saturating_sub(1);
            let x1 = (px + 1).min(q_data.w - 1);
            let y1 = (py + 1).min(q_data.h - 1);
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    if marked.at(nx, ny) != Cell::Unmarked {
                        continue;
                    }
                    let level = q_data.at(nx, ny);
                    // Anything valid but weaker than the center means the
                    // region could still grow at a lower floor.
                    if !will_be_considered_again && level >= 0 && level < center_level {
                        will_be_considered_again = true;
                    }
                    if level >= bin_lower {
                        as_bin.push((nx, ny));
                    } else if level >= 0 {
                        // Not verified as closest to any center on purpose:
                        // this lets narrow channels of globbed pixels form.
                        as_glob.push((nx, ny));
                    }
                }
            }
        }

        if bin_lower == 0 {
            // No lower floor to retry at.
            will_be_considered_again = false;
        }

        let big_enough = marked_so_far.len() >= self.max_size;
        if big_enough {
            // Capture as-is; the lower-valued fringe is absorbed later.
            foothills.push(Foothill {
                center,
                globs: as_glob,
            });
        } else if marked_so_far.len() <= self.min_size {
            for &(mx, my) in &marked_so_far {
                marked.set(mx, my, Cell::Unmarked);
            }
        } else if will_be_considered_again {
            for &(mx, my) in &marked_so_far {
                marked.set(mx, my, Cell::Unmarked);
            }
        }

        big_enough || !will_be_considered_again
    }
}

// Tests
// -----------------------------------------------------------------------------
