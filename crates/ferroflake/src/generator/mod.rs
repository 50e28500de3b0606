mod builder;
mod config;
mod snowflake;

pub use builder::*;
pub use config::*;
pub use snowflake::*;
