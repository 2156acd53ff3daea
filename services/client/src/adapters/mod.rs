pub mod clock;
pub mod http_api;
pub mod storage;

pub use clock::SystemClock;
pub use http_api::HttpApiAdapter;
pub use storage::{JsonFileStore, MemoryStore};
