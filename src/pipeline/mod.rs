pub mod cipher;
pub mod kdf;
pub mod schedule;

pub use cipher::*;
pub use kdf::*;
pub use schedule::*;
