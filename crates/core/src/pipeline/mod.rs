pub mod encode_pool;
pub mod preview_recorder;
