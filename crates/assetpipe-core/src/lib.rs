pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod request;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod worker;
