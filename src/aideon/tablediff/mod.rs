pub mod align;
pub mod compare;
pub mod config;
pub mod error;
pub mod io;
pub mod key;
pub mod mapper;
pub mod model;
pub mod report;
pub mod run;
pub mod transform;

pub use error::{Result, ToolError};
