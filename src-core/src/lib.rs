pub mod genetics;
pub mod utils;
