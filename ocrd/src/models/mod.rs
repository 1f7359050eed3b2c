mod input;
mod recognition;

pub use input::*;
pub use recognition::*;
