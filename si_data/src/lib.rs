pub mod error;
pub mod grid;
pub mod layout;
pub mod scout;
pub mod siarray;

pub use error::SiError;
pub use grid::Grid;
