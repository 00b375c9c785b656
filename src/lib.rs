pub mod character;
pub mod cli;
pub mod context;
pub mod data;
pub mod token;
