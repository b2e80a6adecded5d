//! Repository implementations

mod memory;
mod video;

pub use memory::InMemoryVideoRepository;
pub use video::PgVideoRepository;
