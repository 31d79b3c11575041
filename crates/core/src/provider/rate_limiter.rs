//! Token bucket throttle for outbound provider requests.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Token bucket rate limiter.
///
/// Tokens are added at a constant rate and consumed when requests are made.
/// If no tokens are available, the request must wait.
#[derive(Debug)]
pub struct TokenBucket {
    /// Max tokens (= requests per minute).
    capacity: f32,
    /// Current available tokens.
    tokens: f32,
    /// Tokens added per second.
    refill_rate: f32,
    /// Last refill time.
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a new token bucket with the given rate limit.
    ///
    /// The bucket starts full, allowing immediate requests up to the capacity.
    pub fn new(requests_per_minute: u32) -> Self {
        let capacity = requests_per_minute.max(1) as f32;
        Self {
            capacity,
            tokens: capacity, // Start full
            refill_rate: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    /// Try to acquire a token.
    ///
    /// Returns `Err(wait_duration)` if rate limited, with the duration to wait.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            let wait_secs = tokens_needed / self.refill_rate;
            Err(Duration::from_secs_f32(wait_secs))
        }
    }

    /// Tokens currently available.
    pub fn available(&mut self) -> f32 {
        self.refill();
        self.tokens
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f32();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Shared async throttle: callers wait until a token is available.
#[derive(Debug)]
pub struct ProviderThrottle {
    bucket: Mutex<TokenBucket>,
}

impl ProviderThrottle {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(requests_per_minute)),
        }
    }

    /// Wait for a token.
    pub async fn acquire(&self) {
        loop {
            // Lock is released before sleeping so other callers can queue.
            let wait = match self.bucket.lock().await.try_acquire() {
                Ok(()) => return,
                Err(wait) => wait,
            };
            debug!(wait_ms = wait.as_millis() as u64, "Provider throttle engaged");
            sleep(wait).await;
        }
    }
}
