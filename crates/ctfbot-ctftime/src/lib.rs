// ctfbot CTFtime client
//
// Decision: Read-only client for the public CTFtime v1 events API
// Decision: Every call is a single GET; failures map onto BotError variants

pub mod client;

pub use client::{CtftimeClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT, USER_AGENT};
