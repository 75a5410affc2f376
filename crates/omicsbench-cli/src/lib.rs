pub mod benchmark;
pub mod util;
