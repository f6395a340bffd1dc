//! Endpoint modules. Each wraps a `Client` and maps methods to
//! `(verb, path, parameters)` rows.

mod avatars;
mod graphql;
mod health;
mod locale;
mod storage;

pub use avatars::{Avatars, IconOptions};
pub use graphql::Graphql;
pub use health::Health;
pub use locale::Locale;
pub use storage::{PreviewOptions, Storage};
