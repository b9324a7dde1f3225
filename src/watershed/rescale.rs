use crate::im::GridIm;

/// Linearly rescale a field so it spans an integer-friendly range for the
/// quantizer. Physical units (dBZ, mm/h, ...) rarely land on the 0..100 scale
/// the segmentation thresholds are written against; this maps
/// `data_min..data_max` onto `out_min..out_max` without clamping, so values
/// outside the input range extrapolate.
pub fn rescale_grid(
    grid: &GridIm,
    data_min: f32,
    data_max: f32,
    out_min: f32,
    out_max: f32,
) -> GridIm {
    assert!(
        data_max > data_min,
        "rescale needs data_max > data_min (got {data_min}..{data_max})"
    );

    let scale = (out_max - out_min) / (data_max - data_min);
    let mut out = grid.clone();
    for v in &mut out.arr {
        *v = scale * (*v - data_min) + out_min;
    }
    out
}

// Tests
// -----------------------------------------------------------------------------
