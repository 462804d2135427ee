pub mod pool_file;
pub mod repository;
pub mod sample;
