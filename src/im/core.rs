#[derive(Debug, Clone, PartialEq)]
pub struct Im<T, const N_CH: usize> {
    pub w: usize,
    pub h: usize,
    pub s: usize, // stride in elements (w * N_CH)
    pub arr: Vec<T>,
}

// Constructors
// -----------------------------------------------------------------------------
impl<T: Copy + Default, const N_CH: usize> Im<T, N_CH> {
    pub fn new(w: usize, h: usize) -> Self {
        let s = w * N_CH;
        let arr = vec![T::default(); s * h];
        Self { w, h, s, arr }
    }
}

impl<T: Copy, const N_CH: usize> Im<T, N_CH> {
    pub fn filled(w: usize, h: usize, v: T) -> Self {
        let s = w * N_CH;
        let arr = vec![v; s * h];
        Self { w, h, s, arr }
    }
}

impl<T, const N_CH: usize> Im<T, N_CH> {
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, x: usize, y: usize, ch: usize) -> &T {
        unsafe { self.arr.get_unchecked(y * self.s + x * N_CH + ch) }
    }

    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, x: usize, y: usize, ch: usize) -> &mut T {
        unsafe { self.arr.get_unchecked_mut(y * self.s + x * N_CH + ch) }
    }
}

// Single-channel accessors; the algorithms in this crate index pixels
// constantly and these keep the y*s+x arithmetic in one place.
// -----------------------------------------------------------------------------
impl<T: Copy> Im<T, 1> {
    #[inline(always)]
    pub fn at(&self, x: usize, y: usize) -> T {
        self.arr[y * self.s + x]
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        self.arr[y * self.s + x] = v;
    }
}

impl<T: Copy + Default> Im<T, 1> {
    pub fn from_fn<F: FnMut(usize, usize) -> T>(w: usize, h: usize, mut f: F) -> Self {
        let mut im = Self::new(w, h);
        for y in 0..h {
            for x in 0..w {
                im.arr[y * im.s + x] = f(x, y);
            }
        }
        im
    }
}

// Convenience APIs specific to label grids.
// -----------------------------------------------------------------------------
impl Im<i32, 1> {
    /// Highest label value present (0 for an empty or all-sentinel grid).
    pub fn max_label(&self) -> i32 {
        self.arr.iter().copied().max().unwrap_or(0).max(0)
    }
}

/// Real-valued intensity field (e.g. reflectivity or rainfall rate).
pub type GridIm = Im<f32, 1>;
/// Integer label grid: 0 = background, positive = object id, negative = sentinel.
pub type LabelIm = Im<i32, 1>;
pub type RGBAIm = Im<u8, 4>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_zero_and_filled_fills() {
        let im = LabelIm::new(3, 2);
        assert_eq!(im.arr, vec![0; 6]);

        let im = LabelIm::filled(2, 2, -1);
        assert_eq!(im.arr, vec![-1; 4]);
    }

    #[test]
    fn at_and_set_use_row_major_order() {
        let mut im = LabelIm::new(4, 3);
        im.set(3, 2, 7);
        assert_eq!(im.arr[2 * 4 + 3], 7);
        assert_eq!(im.at(3, 2), 7);
    }

    #[test]
    fn max_label_ignores_negative_sentinels() {
        let mut im = LabelIm::filled(2, 2, -3);
        assert_eq!(im.max_label(), 0);
        im.set(1, 1, 5);
        assert_eq!(im.max_label(), 5);
    }

    #[test]
    fn from_fn_passes_coords_in_x_y_order() {
        let im = GridIm::from_fn(3, 2, |x, y| (y * 10 + x) as f32);
        assert_eq!(im.at(2, 1), 12.0);
        assert_eq!(im.at(0, 0), 0.0);
    }
}
