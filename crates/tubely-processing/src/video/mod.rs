//! ffmpeg/ffprobe adapters

mod command;
pub mod probe;
pub mod remux;

pub use probe::{parse_probe_output, FfprobeInspector};
pub use remux::FfmpegRemuxer;
