pub mod buffer;
pub mod playlist;
pub mod reporter;
pub mod segment;
