//! Enhanced watershed segmentation of 2-D intensity fields.
//!
//! The input field is quantized into discrete intensity bins, local maxima are
//! picked as seed centers (strong maxima claim a larger exclusion square than
//! weak ones), and regions are grown seed-by-seed from the highest bin down.
//! A region that cannot yet decide its fate is deferred one bin lower; a
//! region that hits the size cap is finalized and its low-intensity fringe is
//! absorbed as "foothills" so neighboring objects stay distinct.
//!
//! Typical use:
//!
//! ```ignore
//! let ws = EnhancedWatershed::new(25, 80, 200, 15.0, 1);
//! let labels = ws.label_objects(&grid); // 0 = background, 1..=K = objects
//! ```

mod foothills;
mod grow;
mod maxima;
mod quantize;
mod rescale;

pub use rescale::rescale_grid;

use crate::im::{GridIm, Im, LabelIm, ROI};

/// Per-bin pixel (or center) lists, indexed by bin number `0..=max_bin`.
/// Order within a bin is row-major scan order; seed tie-breaks depend on it.
pub type BinIndex = Vec<Vec<(usize, usize)>>;

/// State of one cell of the working label grid.
///
/// `TooSmall` has a diagnostic code but the growth pass never assigns it:
/// undersized regions are reset to `Unmarked` instead. It is kept so the
/// diagnostic encoding has a stable slot for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cell {
    /// Not yet visited, or rolled back.
    #[default]
    Unmarked,
    /// Absorbed as a foothill; permanently excluded from objects.
    Globbed,
    /// Reserved; see above.
    TooSmall,
    /// Member of the object with this (positive) capture index.
    Object(i32),
}

impl Cell {
    /// Diagnostic integer encoding used when `label` is called with
    /// `only_objects = false`.
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            Cell::Unmarked => -1,
            Cell::Globbed => -3,
            Cell::TooSmall => -4,
            Cell::Object(i) => i,
        }
    }
}

/// One finalized-at-max-size region's leftover fringe, queued for foothill
/// absorption at the end of the current bin level.
pub(crate) struct Foothill {
    pub center: (usize, usize),
    pub globs: Vec<(usize, usize)>,
}

/// Watershed segmenter. Holds quantization and size parameters; one instance
/// can label any number of grids.
///
/// * `min_thresh` - minimum field value for a pixel to participate
/// * `max_thresh` - values above this are clamped into the top bin
/// * `data_increment` - quantization step (1 for no quantization)
/// * `max_size` - region size at which growth stops and the region is captured
/// * `min_size` - regions at or below this many pixels are discarded
/// * `dist_btw_objects` - drives the local-maximum exclusion radius
#[derive(Debug, Clone)]
pub struct EnhancedWatershed {
    pub min_thresh: i32,
    pub max_thresh: i32,
    pub data_increment: i32,
    pub max_size: usize,
    pub min_size: usize,
    pub dist_btw_objects: f64,
    max_bin: i32,
}

impl EnhancedWatershed {
    pub fn new(
        min_thresh: i32,
        max_thresh: i32,
        area_threshold: usize,
        dist_btw_objects: f64,
        data_increment: i32,
    ) -> Self {
        assert!(data_increment > 0, "data_increment must be positive");
        assert!(
            dist_btw_objects >= 0.0,
            "dist_btw_objects must be non-negative"
        );
        let max_bin = (max_thresh - min_thresh) / data_increment;
        Self {
            min_thresh,
            max_thresh,
            data_increment,
            max_size: area_threshold,
            min_size: 6,
            dist_btw_objects,
            max_bin,
        }
    }

    /// Highest usable bin number. Negative when `max_thresh < min_thresh`,
    /// in which case `label` returns an empty grid rather than erroring.
    #[inline]
    pub fn max_bin(&self) -> i32 {
        self.max_bin
    }

    /// Label a field. With `only_objects` the output holds 0 for background
    /// and `1..=K` for objects; without it, sentinel codes stay visible
    /// (unmarked = -1, globbed = -3, too-small = -4) for diagnostics.
    pub fn label(&self, grid: &GridIm, only_objects: bool) -> LabelIm {
        let marked: Im<Cell, 1> = if self.max_bin < 0 {
            // Degenerate thresholds leave every pixel untouched.
            Im::<Cell, 1>::new(grid.w, grid.h)
        } else {
            let (bins, q_data) = self.quantize(grid);
            let centers = self.find_local_maxima(&q_data, &bins);
            self.grow_centers(&centers, &q_data)
        };

        LabelIm::from_fn(grid.w, grid.h, |x, y| {
            let code = marked.at(x, y).code();
            if only_objects { code.max(0) } else { code }
        })
    }

    /// `label` with the usual objects-only output.
    pub fn label_objects(&self, grid: &GridIm) -> LabelIm {
        self.label(grid, true)
    }
}

/// Remove labeled objects smaller than `min_size` pixels (or with a
/// single-row / single-column bounding box) and renumber the survivors to a
/// contiguous `1..=K`, in ascending original-label order.
pub fn size_filter(labeled: &LabelIm, min_size: usize) -> LabelIm {
    use std::collections::BTreeMap;

    let mut stats: BTreeMap<i32, (usize, ROI)> = BTreeMap::new();
    for y in 0..labeled.h {
        for x in 0..labeled.w {
            let v = labeled.at(x, y);
            if v <= 0 {
                continue;
            }
            stats
                .entry(v)
                .and_modify(|(size, roi)| {
                    *size += 1;
                    roi.include(x, y);
                })
                .or_insert((1, ROI::pixel(x, y)));
        }
    }

    let mut remap: BTreeMap<i32, i32> = BTreeMap::new();
    let mut next = 1;
    for (&label, &(size, roi)) in &stats {
        if size >= min_size && roi.w() > 1 && roi.h() > 1 {
            remap.insert(label, next);
            next += 1;
        }
    }

    LabelIm::from_fn(labeled.w, labeled.h, |x, y| {
        let v = labeled.at(x, y);
        if v > 0 {
            remap.get(&v).copied().unwrap_or(0)
        } else {
            0
        }
    })
}

// Tests
// -----------------------------------------------------------------------------
