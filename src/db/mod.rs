pub mod audit;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod periods;
pub mod pool;
pub mod records;
