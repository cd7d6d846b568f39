pub mod auth_service;
pub mod booking_service;
pub mod branch_service;
pub mod catalog_service;
pub mod customer_service;
pub mod report_service;

pub use auth_service::*;
pub use booking_service::*;
pub use branch_service::*;
pub use catalog_service::*;
pub use customer_service::*;
pub use report_service::*;
