//! Application-wide constants and configuration values
//!
//! Feed codes, cache sizing and HTTP tuning live here so the domain modules
//! read as plain lookups.

/// Default SportsData MLB endpoint (v4 trial tier)
pub const DEFAULT_API_DOMAIN: &str = "http://api.sportsdatallc.org/mlb-t4";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Sport discriminant carried by every game and side in this crate
pub const SPORT_MLB: &str = "MLB";

/// Outcome codes used by the box score play-by-play
pub mod outcome_codes {
    /// Hitter outcome for a home run
    pub const HOME_RUN: &str = "aHR";

    /// Strikeout looking
    pub const STRIKEOUT_LOOKING: &str = "kKL";

    /// Strikeout swinging
    pub const STRIKEOUT_SWINGING: &str = "kKS";
}

/// Cache sizing and TTL values
pub mod cache {
    /// Default number of feed fragments kept in the in-memory cache
    pub const DEFAULT_CAPACITY: usize = 500;

    /// Number of raw HTTP bodies kept by the feed source
    pub const HTTP_RESPONSE_CAPACITY: usize = 100;

    /// TTL for raw HTTP bodies of daily batch feeds (schedule, box score)
    pub const DAILY_FEED_SECONDS: u64 = 60;

    /// TTL for raw HTTP bodies of per-game feeds
    pub const GAME_FEED_SECONDS: u64 = 300;

    /// TTL for the venue directory body
    pub const VENUE_DIRECTORY_SECONDS: u64 = 86400;
}

/// Client-side rate limiting
pub mod rate_limit {
    /// Requests per second allowed by the trial API tier
    pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 3;

    /// Fraction of the request interval added as random jitter
    pub const INTERVAL_RANDOMNESS: f64 = 0.5;
}

/// Environment variable names
pub mod env_vars {
    /// Environment variable for API domain override
    pub const API_DOMAIN: &str = "SPORTSDATA_API_DOMAIN";

    /// Environment variable for the API key
    pub const API_KEY: &str = "SPORTSDATA_API_KEY";

    /// Environment variable for log file path override
    pub const LOG_FILE: &str = "SPORTSDATA_LOG_FILE";

    /// Environment variable for HTTP timeout in seconds
    pub const HTTP_TIMEOUT: &str = "SPORTSDATA_HTTP_TIMEOUT";
}

/// Retry configuration
pub mod retry {
    /// Maximum number of retry attempts for API calls
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 250;

    /// Retry delay for rate limit errors (seconds)
    pub const RATE_LIMIT_DELAY_SECONDS: u64 = 60;

    /// Retry delay for server errors (seconds)
    pub const SERVER_ERROR_DELAY_SECONDS: u64 = 5;

    /// Retry delay for service unavailable errors (seconds)
    pub const SERVICE_UNAVAILABLE_DELAY_SECONDS: u64 = 30;

    /// Retry delay for network timeouts (seconds)
    pub const NETWORK_TIMEOUT_DELAY_SECONDS: u64 = 2;

    /// Retry delay for connection failures (seconds)
    pub const NETWORK_CONNECTION_DELAY_SECONDS: u64 = 10;
}
