pub mod dump;
pub mod fanout;
pub mod reddit;
pub mod retry;
pub mod source;
pub mod time;
pub mod x;
pub mod youtube;

pub use dump::{DumpFormat, JsonDumpSource};
pub use fanout::{fetch_all, FetchOutcome, SourceFailure};
pub use reddit::{parse_reddit_listing, RedditPostData};
pub use retry::{execute_with_retry, RetryConfig, RetryStrategy};
pub use source::{PostSource, SearchQuery, TimeFilter};
pub use time::format_relative_time;
pub use x::parse_x_search;
pub use youtube::parse_youtube_list;
