// handlers/mod.rs - HTTP endpoints
//
// Every data endpoint runs the same pipeline: method check, bearer token
// verification, then exactly one store call scoped to the verified user.
pub mod facts;
