pub mod booking_code;
pub mod jwt;
pub mod loyalty;
pub mod password;
pub mod phone;
pub mod validation;
pub mod vehicle_plate;

pub use booking_code::*;
pub use jwt::*;
pub use loyalty::*;
pub use password::*;
pub use phone::*;
pub use validation::*;
pub use vehicle_plate::*;
