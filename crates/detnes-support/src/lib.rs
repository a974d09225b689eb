//! Driver layer on top of `detnes-core`: fixed-cadence headless stepping,
//! button timelines, blob compression and a content-addressed blob store.

pub mod activity;
pub mod compress;
pub mod error;
pub mod headless;
pub mod store;

pub use activity::{Action, Activity};
pub use compress::{compress_blob, decompress_blob};
pub use error::SupportError as Error;
pub use headless::HeadlessDriver;
pub use store::PreimageStore;
