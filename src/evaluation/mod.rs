pub mod mask_overlap;
pub mod report;
