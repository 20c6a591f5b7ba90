// handlers/protected/mod.rs - Handlers behind bearer token verification
//
// Routes here carry the `verify_token` middleware. Verification is fail-open,
// so each handler inspects the optional `VerifiedIdentity` extension itself and
// decides what an anonymous caller gets.

pub mod admin;

pub use admin::make_admin;
