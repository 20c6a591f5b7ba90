// handlers/public/mod.rs - Public storefront handlers
//
// Every endpoint here is reachable without a bearer token. Each handler makes
// exactly one document store call and returns the store's result as JSON.
//
// Security Level: None (completely public access)
// Middleware: None

pub mod orders;
pub mod reviews;
pub mod status;
pub mod users;
pub mod watches;
