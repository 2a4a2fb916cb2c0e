pub mod league;
pub mod result;
pub mod schedule;
pub mod table;
pub mod zone;

pub use league::*;
pub use result::*;
pub use schedule::*;
pub use table::*;
pub use zone::*;
