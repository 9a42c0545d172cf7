mod api;
mod credentials;
mod export;
mod ids;
mod seed;
pub mod utils;

pub use utils::test_store as test_utils;
