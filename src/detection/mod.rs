mod fuser;
mod service;

pub use service::DetectionService;
