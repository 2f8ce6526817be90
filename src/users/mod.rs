mod memory;
mod model;
mod pg;
mod store;

pub use memory::InMemoryUserStore;
pub use model::{PublicUser, User};
pub use pg::PgUserStore;
pub use store::{StoreError, UserStore};
