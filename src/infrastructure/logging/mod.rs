pub mod logger;

pub use logger::LoggerHandle;
