mod build;
mod check;

pub use build::*;
pub use check::*;
