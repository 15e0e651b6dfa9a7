//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
mod collection;
mod quote;
mod session;

pub use auth::AuthService;
pub use collection::{CollectionSync, SaveReceipt};
pub use quote::{QuoteFetch, QuoteService};
pub use session::SessionController;
