pub mod entities;
pub mod parse;
