pub mod maps;
pub mod pins;

pub use maps::*;
pub use pins::*;
