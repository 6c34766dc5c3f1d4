pub mod reference;
pub mod types;
pub mod values;

pub use reference::*;
pub use types::*;
pub use values::{lenient_json, lenient_timestamp, parse_timestamp};
