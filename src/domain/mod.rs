pub mod access;
pub mod aggregation;
pub mod chart;
pub mod interval;
pub mod models;
