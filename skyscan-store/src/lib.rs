mod config;
mod hosted;

pub use config::StoreConfig;
pub use hosted::{HostedStore, content_type_for};
