// Library crate root.
//
// Grids and labeled grids live in `im`, the segmentation algorithm in
// `watershed`, temporal linking in `track`, and JSON config parsing in
// `desc`.

pub mod im;
pub mod desc;
pub mod watershed;
pub mod track;

#[cfg(test)]
pub mod test_helpers;
