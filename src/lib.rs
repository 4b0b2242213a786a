pub mod config;
pub mod heap;
pub mod inspect;
pub mod report;
pub mod storage;
