pub mod application;
pub mod delivery;
pub mod endpoint;
pub mod event;
pub mod user;

pub use application::Application;
pub use delivery::DeliveryAttempt;
pub use endpoint::Endpoint;
pub use event::BlockchainEvent;
pub use user::User;
