pub mod capture;
pub mod sink;

pub use capture::MediaRecorderCapture;
pub use sink::HtmlAudioSink;
