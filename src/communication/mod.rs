pub mod position_feed;

pub use position_feed::{
    decode_sample, DecodeError, FeedError, FeedStats, PositionFeed, SharedFeedStats,
    SharedLatestPosition,
};
