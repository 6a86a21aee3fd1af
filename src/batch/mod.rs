pub mod runner;
pub mod scan;
