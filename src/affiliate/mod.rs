//! Text heuristics over affiliate links and task descriptions.
//!
//! Everything here is pure: no I/O, no shared state beyond static tables.

pub mod comment;
pub mod geo;
pub mod html;
pub mod lineup;
pub mod params;

pub use comment::{CommentSegment, SegmentAttributes, TrackerComment, build_comment};
pub use geo::{lookup_geo, normalize_geo};
pub use lineup::{extract_links, find_section, is_cloaked};
pub use params::{
    TRACKING_PARAMS, TrackingParam, resolve_tracking_param, substitute_tracking_value,
    substitute_tracking_value_matching,
};
