pub mod allocation;
pub mod matching;
pub mod roster;
