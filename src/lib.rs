pub mod api;
pub mod config;
pub mod error;
pub mod server; // JSON-RPC stdio loop
pub mod utils;

pub use api::{Dispatcher, Payload, PayloadKind, PoolKind, QuotaConfig, QuotaPool, QuotaPools};
pub use error::{DexError, ErrorKind, Result};
