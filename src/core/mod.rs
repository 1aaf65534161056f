pub mod engine;
pub mod fares;
pub mod normalize;
pub mod pricing;
pub mod report;
pub mod search;
pub mod session;

pub use crate::domain::model::{Booking, Flight};
pub use crate::domain::ports::{ConfigProvider, FlightApi, SessionStore};
pub use crate::utils::error::Result;
