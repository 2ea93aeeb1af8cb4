//! Domain logic for node route aliases.
//!
//! Everything here is pure: no database access and no filesystem writes.
//! The `db` crate persists routes, the `sync` crate wires the pieces
//! together around content save/delete events.

pub mod alias;
pub mod content;
pub mod permissions;
pub mod route_body;
pub mod routes_file;
pub mod types;
