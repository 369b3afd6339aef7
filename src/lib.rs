pub mod grid;
pub mod output;
pub mod parse;
