use serde::Deserialize;

use crate::track::ObjectTracker;
use crate::watershed::EnhancedWatershed;

// Job descriptions parsed from JSON. These are the serialization boundary;
// the runtime types (`EnhancedWatershed`, `ObjectTracker`) are built from them
// and hold derived values the JSON never carries.

fn default_data_increment() -> i32 {
    1
}

fn default_mend_dist() -> i64 {
    3
}

/// Segmentation parameters for one watershed job.
///
/// `min_thresh`/`max_thresh`/`data_increment` are in the (integer-rescaled)
/// units of the input field; `area_threshold` and `dist_btw_objects` are in
/// pixels.
#[derive(Debug, Clone, Deserialize)]
pub struct SegDesc {
    pub min_thresh: i32,
    pub max_thresh: i32,
    #[serde(default = "default_data_increment")]
    pub data_increment: i32,
    pub area_threshold: usize,
    pub dist_btw_objects: f64,
}

impl SegDesc {
    pub fn to_watershed(&self) -> EnhancedWatershed {
        EnhancedWatershed::new(
            self.min_thresh,
            self.max_thresh,
            self.area_threshold,
            self.dist_btw_objects,
            self.data_increment,
        )
    }
}

/// Tracking parameters for linking labeled grids across time steps.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackDesc {
    #[serde(default)]
    pub percent_overlap: f64,
    #[serde(default)]
    pub mend_tracks: bool,
    #[serde(default = "default_mend_dist")]
    pub mend_dist: i64,
}

impl TrackDesc {
    pub fn to_tracker(&self) -> ObjectTracker {
        ObjectTracker {
            percent_overlap: self.percent_overlap,
            mend_tracks: self.mend_tracks,
            mend_dist: self.mend_dist,
        }
    }
}

pub fn parse_seg_json(json_text: &str) -> Result<SegDesc, serde_json::Error> {
    serde_json::from_str(json_text)
}

pub fn parse_track_json(json_text: &str) -> Result<TrackDesc, serde_json::Error> {
    serde_json::from_str(json_text)
}

// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SEG_JSON: &str = r#"
        {
            "min_thresh": 25,
            "max_thresh": 80,
            "area_threshold": 200,
            "dist_btw_objects": 15.0
        }
    "#;

    #[test]
    fn seg_desc_parses_and_defaults_increment() {
        let desc = parse_seg_json(SEG_JSON).expect("sample json should deserialize");
        assert_eq!(desc.min_thresh, 25);
        assert_eq!(desc.max_thresh, 80);
        assert_eq!(desc.data_increment, 1);
        assert_eq!(desc.area_threshold, 200);

        let ws = desc.to_watershed();
        assert_eq!(ws.max_bin(), 55);
        assert_eq!(ws.min_size, 6);
    }

    #[test]
    fn track_desc_defaults() {
        let desc: TrackDesc = parse_track_json("{}").unwrap();
        assert_eq!(desc.percent_overlap, 0.0);
        assert!(!desc.mend_tracks);
        assert_eq!(desc.mend_dist, 3);

        let tracker = desc.to_tracker();
        assert_eq!(tracker.mend_dist, 3);
    }

    #[test]
    fn seg_desc_rejects_missing_fields() {
        assert!(parse_seg_json(r#"{ "min_thresh": 25 }"#).is_err());
    }
}
