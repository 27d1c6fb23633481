mod api;
pub mod smoke;

pub use api::{ClientError, TodoClient};
