#[macro_use]
extern crate lazy_static;

pub mod driver;
pub mod frontend;
