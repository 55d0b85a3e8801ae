pub mod client;
pub mod envelope;
pub mod reconcile;
pub mod record;
