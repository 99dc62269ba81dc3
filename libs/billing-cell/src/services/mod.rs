pub mod limits;
pub mod stripe;
pub mod subscription;

pub use limits::LimitsService;
pub use stripe::StripeClient;
pub use subscription::SubscriptionService;
