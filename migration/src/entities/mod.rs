pub mod session;

pub use session::Entity as SessionEntity;
