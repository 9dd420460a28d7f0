pub mod api;
pub mod args;
pub mod detector;
pub mod filter;
pub mod monitor;
pub mod source;
pub mod spectrum;
pub mod util;
