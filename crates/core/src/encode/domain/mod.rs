pub mod segment_encoder;
