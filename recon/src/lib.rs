pub mod coords;
pub mod dft;
pub mod shift;
pub mod volume;
