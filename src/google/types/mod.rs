mod classroom;
mod token;

pub use classroom::*;
pub use token::*;
