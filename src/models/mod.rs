pub mod user;
pub mod token_alert;
pub mod alert_outcome;

pub use user::{Channel, NotifyBy, PriceAlerts, User, WatchlistEntry};
pub use token_alert::TokenAlert;
pub use alert_outcome::{AlertOutcome, AlertSent, DeliveryFailure};
