//! JSON over HTTP
//!
//! [`JsonFetcher`] owns the transport contract: issue the request, parse the
//! JSON body, and classify the outcome by status. [`HttpOtpGateway`] maps the
//! two verification operations onto it.

mod fetcher;
mod gateway;

pub use fetcher::JsonFetcher;
pub use gateway::HttpOtpGateway;
