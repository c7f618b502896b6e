//! Protocol Module
//!
//! Defines the request/response vocabulary shared by the client and its
//! transports. The byte-level memcached framing belongs to the transport;
//! this module only names what is asked and what comes back.
//!
//! ## Commands
//! - `get`, `gets`, `get_multi`, `gets_multi`: retrieval
//! - `set`, `add`, `replace`, `append`, `prepend`: storage (`Store`)
//! - `cas`: conditional storage with a CAS token
//! - `incr`, `decr`: counters
//! - `delete`, `flush_all`, `stats`, `version`: housekeeping
//!
//! ## Responses
//! - `Item` / `Items`: retrieved payloads with flags and optional CAS token
//! - `Store`: STORED / NOT_STORED / EXISTS / NOT_FOUND
//! - `Counter`, `Deleted`, `Ok`, `Stats`, `Version`
//! - `Error`: the server refused the command

mod command;
mod response;

pub use command::{Command, StoreMode};
pub use response::{Item, Response, StoreStatus};
