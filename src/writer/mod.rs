//! Output writers: the C source handed to the compiler and the Rust bindings
//! produced in wrapper mode.
pub mod c;
pub mod rust;
