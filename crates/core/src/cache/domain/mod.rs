pub mod frame_cache;
