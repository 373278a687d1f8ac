pub mod quartiles;
pub mod reference_stats;
pub mod standard_scaler;
