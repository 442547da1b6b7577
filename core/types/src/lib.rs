pub mod error;
pub mod item;
pub mod rule;
pub mod plan;
pub mod dedup;
pub mod config;

pub use error::*;
pub use item::*;
pub use rule::*;
pub use plan::*;
pub use dedup::*;
pub use config::*;
