pub mod common;
pub mod list;
pub mod status;
pub mod sync;
