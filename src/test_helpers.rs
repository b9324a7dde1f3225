//! Ascii-grid fixtures for tests. Digits become cell values, which keeps
//! small scenario grids readable inline.

use crate::im::{GridIm, LabelIm};

/// Parse an indented ascii block of digits into a grid. Blank lines and
/// leading/trailing whitespace per line are ignored; all rows must have the
/// same width.
pub fn grid_from_ascii(ascii: &str) -> GridIm {
    let rows: Vec<&str> = ascii
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    assert!(!rows.is_empty(), "ascii grid has no rows");

    let w = rows[0].len();
    let h = rows.len();
    let mut im = GridIm::new(w, h);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), w, "ragged ascii grid at row {y}");
        for (x, ch) in row.chars().enumerate() {
            let v = ch.to_digit(10).unwrap_or_else(|| panic!("non-digit {ch:?} at ({x}, {y})"));
            im.set(x, y, v as f32);
        }
    }
    im
}

/// Render a label grid for assertion messages. Labels 1-9 print as digits,
/// 10-35 as letters, background as '.', negatives (diagnostic codes) as '-'.
pub fn labels_to_ascii(im: &LabelIm) -> String {
    let mut out = String::with_capacity((im.w + 1) * im.h);
    for y in 0..im.h {
        for x in 0..im.w {
            let v = im.at(x, y);
            out.push(match v {
                0 => '.',
                1..=9 => (b'0' + v as u8) as char,
                10..=35 => (b'A' + (v - 10) as u8) as char,
                v if v < 0 => '-',
                _ => '*',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_grid() {
        let grid = grid_from_ascii(
            r#"
                012
                340
            "#,
        );
        assert_eq!((grid.w, grid.h), (3, 2));
        assert_eq!(grid.at(1, 0), 1.0);
        assert_eq!(grid.at(0, 1), 3.0);
    }

    #[test]
    fn label_rendering_covers_all_ranges() {
        let mut im = LabelIm::new(5, 1);
        im.set(1, 0, 7);
        im.set(2, 0, 12);
        im.set(3, 0, -3);
        im.set(4, 0, 99);
        assert_eq!(labels_to_ascii(&im), ".7C-*\n");
    }

    #[test]
    #[should_panic(expected = "ragged ascii grid")]
    fn ragged_rows_are_rejected() {
        let _ = grid_from_ascii("00\n000");
    }
}
