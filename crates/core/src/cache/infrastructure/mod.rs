pub mod jpeg_frame_cache;
