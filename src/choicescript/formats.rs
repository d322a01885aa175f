//! Output formats for parsed scenes
//!
//!     [json]       nested JSON, one object per node
//!     [treeviz]    one line per node, for reading

pub mod json;
pub mod treeviz;

pub use json::to_json;
pub use treeviz::to_treeviz_str;
