pub mod bonus;
pub mod donation;
pub mod table;

pub use bonus::*;
pub use donation::*;
pub use table::*;
