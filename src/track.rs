//! Temporal linking of labeled grids.
//!
//! Objects are linked time step to time step by greatest pixel overlap. When
//! several past objects overlap one future object (a merger), the merged
//! object keeps the label of the largest past object; symmetrically for
//! splits, the largest future piece inherits the past label and the rest keep
//! their own. An optional mend pass joins broken tracks by projecting each
//! track's end forward along its mean motion and adopting tracks that start
//! nearby.

use std::collections::{BTreeMap, BTreeSet};

use crate::im::LabelIm;

pub type Centroid = (i64, i64);

/// Squared centroid displacement. Tracking compares squared distances
/// throughout (including against `mend_dist`), so no square roots anywhere.
#[inline]
fn dist2(a: Centroid, b: Centroid) -> i64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

fn label_areas(im: &LabelIm) -> BTreeMap<i32, usize> {
    let mut areas = BTreeMap::new();
    for &v in &im.arr {
        if v > 0 {
            *areas.entry(v).or_insert(0) += 1;
        }
    }
    areas
}

/// Integer-truncated centroid per label.
fn label_centroids(im: &LabelIm) -> BTreeMap<i32, Centroid> {
    let mut sums: BTreeMap<i32, (i64, i64, i64)> = BTreeMap::new();
    for y in 0..im.h {
        for x in 0..im.w {
            let v = im.at(x, y);
            if v > 0 {
                let e = sums.entry(v).or_insert((0, 0, 0));
                e.0 += x as i64;
                e.1 += y as i64;
                e.2 += 1;
            }
        }
    }
    sums.into_iter()
        .map(|(label, (sx, sy, n))| (label, (sx / n, sy / n)))
        .collect()
}

/// Per-track summary produced by [`ObjectTracker::track_props`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackProps {
    pub label: i32,
    /// Number of time steps the track is present at.
    pub duration: usize,
    /// Sum of squared centroid displacements over consecutive present steps.
    pub length: i64,
}

/// Links labeled grids across time steps by highest overlap.
#[derive(Debug, Clone)]
pub struct ObjectTracker {
    /// Minimum percent overlap for a candidate match; 0.0 means any overlap.
    pub percent_overlap: f64,
    /// Run the broken-track mend pass after tracking.
    pub mend_tracks: bool,
    /// Squared-distance budget for adopting a track during mending.
    pub mend_dist: i64,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self {
            percent_overlap: 0.0,
            mend_tracks: false,
            mend_dist: 3,
        }
    }
}

impl ObjectTracker {
    /// Track a sequence of labeled grids. On return, equal positive labels at
    /// different time steps reference the same object over time, and labels
    /// form a contiguous `1..=K` across the whole sequence.
    ///
    /// All grids must share one shape; this is checked up front.
    pub fn track(&self, steps: &[LabelIm]) -> Vec<LabelIm> {
        assert!(!steps.is_empty(), "track needs at least one time step");
        let (w, h) = (steps[0].w, steps[0].h);
        for s in steps {
            assert!(
                s.w == w && s.h == h,
                "all time steps must share one grid shape"
            );
        }

        // Give every object at every step a globally unique label first.
        let mut tracks = unique_labels(steps);

        for t in 0..tracks.len() - 1 {
            let (head, tail) = tracks.split_at_mut(t + 1);
            let current = &head[t];
            let future = &mut tail[0];

            let (mut before, mut after) = self.match_labels(current, future);

            let areas_before = label_areas(current);
            let areas_after = label_areas(future);
            check_for_mergers(&mut before, &mut after, &areas_before);
            check_for_splits(&mut before, &mut after, &areas_after);

            // Matched future objects inherit the past label. Masks come from
            // a snapshot so earlier renames in this step can't alias.
            let snapshot = future.clone();
            for (&past, &fut) in before.iter().zip(after.iter()) {
                for (dst, &src) in future.arr.iter_mut().zip(snapshot.arr.iter()) {
                    if src == fut {
                        *dst = past;
                    }
                }
            }
        }

        let tracks = relabel(&tracks);
        if self.mend_tracks {
            self.mend_broken_tracks(tracks)
        } else {
            tracks
        }
    }

    /// Greedy one-to-one matching of (past, future) labels by descending
    /// percent overlap `|A ∩ B| / (|A| + |B|)`. Ties break by label pair, so
    /// matching is deterministic.
    pub fn match_labels(&self, current: &LabelIm, future: &LabelIm) -> (Vec<i32>, Vec<i32>) {
        let ranked = self.find_possible_matches(current, future);

        let mut matched_before: Vec<i32> = Vec::new();
        let mut matched_after: Vec<i32> = Vec::new();
        for ((a, b), _) in ranked {
            if !matched_before.contains(&a) && !matched_after.contains(&b) {
                matched_before.push(a);
                matched_after.push(b);
            }
        }
        (matched_before, matched_after)
    }

    /// All overlapping (past, future) label pairs above the overlap floor,
    /// sorted best-first.
    fn find_possible_matches(&self, current: &LabelIm, future: &LabelIm) -> Vec<((i32, i32), f64)> {
        let areas_a = label_areas(current);
        let areas_b = label_areas(future);

        let mut inter: BTreeMap<(i32, i32), usize> = BTreeMap::new();
        for (&a, &b) in current.arr.iter().zip(future.arr.iter()) {
            if a > 0 && b > 0 {
                *inter.entry((a, b)).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<((i32, i32), f64)> = inter
            .into_iter()
            .map(|((a, b), n)| {
                let denom = (areas_a[&a] + areas_b[&b]) as f64;
                ((a, b), n as f64 / denom)
            })
            .filter(|&(_, pct)| pct > self.percent_overlap)
            .collect();

        // Stable sort keeps the ascending label-pair order among equal
        // percents.
        ranked.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Per-track centroid sequence (`None` where a track is absent).
    pub fn track_paths(tracks: &[LabelIm]) -> BTreeMap<i32, Vec<Option<Centroid>>> {
        let mut labels: BTreeSet<i32> = BTreeSet::new();
        for im in tracks {
            labels.extend(im.arr.iter().copied().filter(|&v| v > 0));
        }

        let mut paths: BTreeMap<i32, Vec<Option<Centroid>>> =
            labels.iter().map(|&l| (l, Vec::new())).collect();
        for im in tracks {
            let centroids = label_centroids(im);
            for (&label, path) in paths.iter_mut() {
                path.push(centroids.get(&label).copied());
            }
        }
        paths
    }

    /// Duration and path length per track.
    pub fn track_props(tracks: &[LabelIm]) -> Vec<TrackProps> {
        Self::track_paths(tracks)
            .into_iter()
            .map(|(label, path)| {
                let duration = path.iter().filter(|c| c.is_some()).count();
                let length = path
                    .windows(2)
                    .map(|w| match (w[0], w[1]) {
                        (Some(a), Some(b)) => dist2(a, b),
                        _ => 0,
                    })
                    .sum();
                TrackProps {
                    label,
                    duration,
                    length,
                }
            })
            .collect()
    }

    /// Join broken tracks: project each track's end forward one step along
    /// its mean centroid motion; a track starting at (or right after) that
    /// end time within `mend_dist` (squared) is relabeled to the projected
    /// track.
    fn mend_broken_tracks(&self, tracks: Vec<LabelIm>) -> Vec<LabelIm> {
        let paths = Self::track_paths(&tracks);
        let span: BTreeMap<i32, (usize, usize)> = paths
            .iter()
            .filter_map(|(&label, path)| {
                let first = path.iter().position(|c| c.is_some())?;
                let last = path.iter().rposition(|c| c.is_some())?;
                Some((label, (first, last)))
            })
            .collect();

        let mut out = tracks.clone();
        for (&label, path) in &paths {
            // Mean per-step motion over consecutive present centroids.
            let mut steps = 0i64;
            let mut sum = (0i64, 0i64);
            for w in path.windows(2) {
                if let (Some(a), Some(b)) = (w[0], w[1]) {
                    sum.0 += b.0 - a.0;
                    sum.1 += b.1 - a.1;
                    steps += 1;
                }
            }
            if steps == 0 {
                continue;
            }
            let (dx, dy) = (sum.0 as f64 / steps as f64, sum.1 as f64 / steps as f64);

            let (_, end) = span[&label];
            let Some((ex, ey)) = path[end] else { continue };
            let x_proj = ex as f64 + dx;
            let y_proj = ey as f64 + dy;

            for (&other, other_path) in &paths {
                if other == label {
                    continue;
                }
                let (other_start, _) = span[&other];
                if other_start != end && other_start != end + 1 {
                    continue;
                }

                // Start point of the candidate track, at this track's end
                // time or one step later.
                let start = other_path
                    .get(end)
                    .copied()
                    .flatten()
                    .or_else(|| other_path.get(end + 1).copied().flatten());
                let Some((ox, oy)) = start else { continue };

                let ddx = x_proj - ox as f64;
                let ddy = y_proj - oy as f64;
                let d2 = ddx * ddx + ddy * ddy;
                if d2 > 0.0 && d2 <= self.mend_dist as f64 {
                    for (im_out, im_src) in out.iter_mut().zip(tracks.iter()) {
                        for (dst, &src) in im_out.arr.iter_mut().zip(im_src.arr.iter()) {
                            if src == other {
                                *dst = label;
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

/// Renumber a sequence so every object at every time step carries a globally
/// unique label (ascending by step, then by original label).
pub fn unique_labels(steps: &[LabelIm]) -> Vec<LabelIm> {
    let mut next = 1;
    steps
        .iter()
        .map(|im| {
            let present: BTreeSet<i32> = im.arr.iter().copied().filter(|&v| v > 0).collect();
            let mut map: BTreeMap<i32, i32> = BTreeMap::new();
            for v in present {
                map.insert(v, next);
                next += 1;
            }
            LabelIm {
                w: im.w,
                h: im.h,
                s: im.s,
                arr: im
                    .arr
                    .iter()
                    .map(|&v| if v > 0 { map[&v] } else { 0 })
                    .collect(),
            }
        })
        .collect()
}

/// Renumber so the labels used across the whole sequence form `1..=K`.
pub fn relabel(steps: &[LabelIm]) -> Vec<LabelIm> {
    let mut present: BTreeSet<i32> = BTreeSet::new();
    for im in steps {
        present.extend(im.arr.iter().copied().filter(|&v| v > 0));
    }
    let map: BTreeMap<i32, i32> = present
        .into_iter()
        .zip(1..)
        .map(|(old, new)| (old, new))
        .collect();

    steps
        .iter()
        .map(|im| LabelIm {
            w: im.w,
            h: im.h,
            s: im.s,
            arr: im
                .arr
                .iter()
                .map(|&v| if v > 0 { map[&v] } else { 0 })
                .collect(),
        })
        .collect()
}

/// Resolve mergers: when one future label is matched by several past labels,
/// keep only the largest past object's match.
pub fn check_for_mergers(
    labels_before: &mut Vec<i32>,
    labels_after: &mut Vec<i32>,
    areas_before: &BTreeMap<i32, usize>,
) {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for &l in labels_after.iter() {
        *counts.entry(l).or_insert(0) += 1;
    }
    for (&merged, &count) in &counts {
        if count < 2 {
            continue;
        }
        let mut group: Vec<i32> = labels_before
            .iter()
            .zip(labels_after.iter())
            .filter(|&(_, &a)| a == merged)
            .map(|(&b, _)| b)
            .collect();
        group.sort_by_key(|l| std::cmp::Reverse(areas_before.get(l).copied().unwrap_or(0)));
        for loser in &group[1..] {
            if let Some(idx) = labels_before.iter().position(|b| b == loser) {
                labels_before.remove(idx);
                labels_after.remove(idx);
            }
        }
    }
}

/// Resolve splits: when one past label is matched to several future labels,
/// only the largest future piece inherits it.
pub fn check_for_splits(
    labels_before: &mut Vec<i32>,
    labels_after: &mut Vec<i32>,
    areas_after: &BTreeMap<i32, usize>,
) {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for &l in labels_before.iter() {
        *counts.entry(l).or_insert(0) += 1;
    }
    for (&split, &count) in &counts {
        if count < 2 {
            continue;
        }
        let mut group: Vec<i32> = labels_before
            .iter()
            .zip(labels_after.iter())
            .filter(|&(&b, _)| b == split)
            .map(|(_, &a)| a)
            .collect();
        group.sort_by_key(|l| std::cmp::Reverse(areas_after.get(l).copied().unwrap_or(0)));
        for loser in &group[1..] {
            if let Some(idx) = labels_after.iter().position(|a| a == loser) {
                labels_before.remove(idx);
                labels_after.remove(idx);
            }
        }
    }
}

// Tests
// -----------------------------------------------------------------------------
