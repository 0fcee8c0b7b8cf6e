pub mod demo;
pub mod helix;

pub use demo::DemoBackend;
pub use helix::HelixBackend;
