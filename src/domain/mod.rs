//! Business rules that hold regardless of where rows are stored.
pub mod aggregates;
pub mod value_objects;
