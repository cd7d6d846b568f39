pub mod bookings;
pub mod branches;
pub mod customers;
pub mod loyalty_transactions;
pub mod wash_services;

pub use bookings::{BookingSource, BookingStatus};
pub use branches::BranchStatus;
pub use loyalty_transactions::LoyaltyTransactionType;
pub use wash_services::ServiceCategory;

pub use bookings as booking_entity;
pub use branches as branch_entity;
pub use customers as customer_entity;
pub use loyalty_transactions as loyalty_transaction_entity;
pub use wash_services as wash_service_entity;
