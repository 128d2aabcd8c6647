pub mod http_feed;
pub mod traits;

pub use http_feed::HttpFeedFetcher;
pub use traits::DrawFetcher;
