#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ROI {
    pub l: usize,
    pub t: usize,
    /// Exclusive right bound.
    pub r: usize,
    /// Exclusive bottom bound.
    pub b: usize,
}

impl ROI {
    /// ROI covering a single pixel.
    pub fn pixel(x: usize, y: usize) -> ROI {
        ROI {
            l: x,
            t: y,
            r: x + 1,
            b: y + 1,
        }
    }

    /// Width of the ROI.
    pub fn w(&self) -> usize {
        self.r - self.l
    }

    /// Height of the ROI.
    pub fn h(&self) -> usize {
        self.b - self.t
    }

    pub fn union(&mut self, other: ROI) {
        self.l = self.l.min(other.l);
        self.t = self.t.min(other.t);
        self.r = self.r.max(other.r);
        self.b = self.b.max(other.b);
    }

    /// Grow the ROI to include the given pixel.
    pub fn include(&mut self, x: usize, y: usize) {
        self.union(ROI::pixel(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_grows_bounds() {
        let mut roi = ROI::pixel(3, 4);
        roi.include(1, 4);
        roi.include(3, 7);
        assert_eq!(roi, ROI { l: 1, t: 4, r: 4, b: 8 });
        assert_eq!(roi.w(), 3);
        assert_eq!(roi.h(), 4);
    }
}
