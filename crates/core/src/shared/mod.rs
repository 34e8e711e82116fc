pub mod constants;
pub mod detection;
pub mod frame;
pub mod stream_config;
pub mod timestamp;
