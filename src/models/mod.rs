pub mod auth;
pub mod booking;
pub mod branch;
pub mod common;
pub mod customer;
pub mod pagination;
pub mod report;
pub mod wash_service;

pub use auth::*;
pub use booking::*;
pub use branch::*;
pub use common::*;
pub use customer::*;
pub use pagination::*;
pub use report::*;
pub use wash_service::*;
