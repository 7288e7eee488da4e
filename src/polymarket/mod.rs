pub mod data_client;

pub use data_client::{DataClient, DataClientError};
