pub mod parse;
pub mod tag;
pub mod time;
