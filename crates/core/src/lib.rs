pub mod admission;
pub mod cache;
pub mod encode;
pub mod pipeline;
pub mod segment;
pub mod shared;
