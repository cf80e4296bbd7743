pub mod config;
pub mod detect;
pub mod encoding;
pub mod error;
pub mod repair;
pub mod scan;
pub mod tokens;
pub mod uniontype;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::uniontype::*;
}
