//! Conversions between the editable mask layer and mask images exchanged with services.

mod automask;
mod binary;

pub use automask::{normalize_segmentation, BACKGROUND_THRESHOLD};
pub use binary::{binarize_mask, decode_binary_mask, encode_binary_mask, SELECTED, UNSELECTED};
