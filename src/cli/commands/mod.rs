mod cache;
mod catalog;
mod config;
mod flash;
mod random;

pub use self::cache::cache;
pub use self::catalog::{stats, systems, update};
pub use self::config::config;
pub use self::flash::flash;
pub use self::random::{any, random};
