pub mod bench;
pub mod demo;
pub mod interactive;
pub mod report;
