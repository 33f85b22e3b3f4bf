use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Token bucket used to pace outbound calls to the completion API.
///
/// Must be created inside a Tokio runtime; the refill task stops when the
/// last clone is dropped.
pub struct RateLimiter {
    sem: Arc<Semaphore>,
    refill: Arc<RefillTask>,
}

struct RefillTask(JoinHandle<()>);

impl Drop for RefillTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        RateLimiter { sem: self.sem.clone(), refill: self.refill.clone() }
    }
}

impl RateLimiter {
    pub fn new(tokens_per_sec: u32) -> Self {
        let burst = 1usize;
        let sem = Arc::new(Semaphore::new(burst));
        let sem_bg = sem.clone();
        let interval_ms = (1000u32 / tokens_per_sec.max(1)) as u64;
        let handle = tokio::spawn(async move {
            let mut t = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
            t.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            t.tick().await;
            loop {
                t.tick().await;
                // Idle periods must not bank an unbounded burst.
                if sem_bg.available_permits() < burst {
                    sem_bg.add_permits(1);
                }
            }
        });
        RateLimiter { sem, refill: Arc::new(RefillTask(handle)) }
    }

    /// `None` when pacing is disabled (`qps == 0`).
    pub fn optional(qps: u32) -> Option<Self> {
        if qps == 0 { None } else { Some(Self::new(qps)) }
    }

    pub async fn acquire(&self) {
        if let Ok(permit) = self.sem.acquire().await {
            permit.forget();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn first_token_is_immediate() {
        let rl = RateLimiter::new(1);
        let start = Instant::now();
        rl.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn second_token_waits_for_refill() {
        let rl = RateLimiter::new(20);
        rl.acquire().await;
        let start = Instant::now();
        rl.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn zero_qps_disables_pacing() {
        assert!(RateLimiter::optional(0).is_none());
    }
}
