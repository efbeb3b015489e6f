pub mod booking;
pub mod car;
pub mod category;
pub mod payment;
pub mod pricing_plan;
pub mod user;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use car::{Car, CarStatus};
pub use category::Category;
pub use payment::{MockOutcome, Payment, PaymentStatus};
pub use pricing_plan::{PriceQuote, PricingPlan};
pub use user::{NewUser, User, UserRole};
