//! The dns module implements the DNS protocol and the lookup strategies built
//! on top of it

pub mod buffer;
pub mod client;
pub mod context;
pub mod external;
pub mod lookup;
pub mod name;
pub mod protocol;
pub mod query;
pub mod rdata;
pub mod resolve;
pub mod response;
