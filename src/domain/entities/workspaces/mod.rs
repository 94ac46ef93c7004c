pub mod integration;
pub mod member;
pub mod workspace;

pub use integration::*;
pub use member::*;
pub use workspace::*;
