pub mod output;
pub mod replay;
