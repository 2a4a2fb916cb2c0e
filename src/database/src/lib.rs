pub mod generators;
pub mod loaders;
pub mod stores;

pub use generators::*;
pub use loaders::*;
pub use stores::*;
