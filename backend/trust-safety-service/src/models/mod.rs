pub mod enforcement;

pub use enforcement::*;
