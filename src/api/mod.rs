pub mod extract;
pub mod handlers;
pub mod router;

pub use router::{create_analytics_router, create_api_router, create_data_router};
