//! In-process token bucket, one bucket per account. Stands in for an
//! externally deployed limiter behind the same [`RateLimiter`] seam.

use std::sync::{Mutex, PoisonError};

use ahash::AHashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, RateLimiter, Result};

struct Bucket {
	tokens: f64,
	refreshed_at: OffsetDateTime,
}

pub struct TokenBucketLimiter {
	capacity: f64,
	per_second: f64,
	buckets: Mutex<AHashMap<Uuid, Bucket>>,
}

impl TokenBucketLimiter {
	pub fn new(limits: &rolo_config::Limits) -> Self {
		Self {
			capacity: f64::from(limits.burst.max(1)),
			per_second: f64::from(limits.search_per_minute.max(1)) / 60.0,
			buckets: Mutex::new(AHashMap::new()),
		}
	}
}

impl RateLimiter for TokenBucketLimiter {
	fn acquire(&self, account_id: Uuid, now: OffsetDateTime) -> Result<()> {
		let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
		let bucket = buckets
			.entry(account_id)
			.or_insert(Bucket { tokens: self.capacity, refreshed_at: now });
		// Clock skew between callers must not mint tokens.
		let elapsed = (now - bucket.refreshed_at).as_seconds_f64().max(0.0);

		bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.capacity);
		bucket.refreshed_at = now;

		if bucket.tokens >= 1.0 {
			bucket.tokens -= 1.0;

			return Ok(());
		}

		let deficit = 1.0 - bucket.tokens;
		let retry_after_secs = (deficit / self.per_second).ceil().max(1.0) as u64;

		Err(Error::RateLimited { retry_after_secs })
	}
}
