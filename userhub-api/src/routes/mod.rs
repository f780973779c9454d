/// API route handlers
///
/// - `health`: Health check endpoint
/// - `users`: User lookup, creation and subscription updates

pub mod health;
pub mod users;
