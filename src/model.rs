pub mod config;
pub mod error;
pub mod foreign;
pub mod function;
pub mod host;
pub mod object;
pub mod operations;
pub mod space;
pub mod value;
