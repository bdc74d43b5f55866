pub mod extract;
pub mod response;
pub mod validate;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult, Deleted};
