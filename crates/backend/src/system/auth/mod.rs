pub mod extractor;
pub mod middleware;

pub use extractor::CurrentSession;
pub use middleware::require_session;
