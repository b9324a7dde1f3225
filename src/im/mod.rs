pub mod core;
#[allow(unused_imports)]
pub use core::{GridIm, Im, LabelIm, RGBAIm};

pub mod roi;
#[allow(unused_imports)]
pub use roi::ROI;

// Optional extras
// -----------------------------------------------------------------------------

#[cfg(feature = "im-io")]
pub mod io;

// Debug UI window
// -----------------------------------------------------------------------------

#[cfg(all(feature = "debug_ui", not(feature = "cli_only")))]
pub mod debug_ui;
