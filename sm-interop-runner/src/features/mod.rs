pub mod aggregation;
pub mod matrix;
