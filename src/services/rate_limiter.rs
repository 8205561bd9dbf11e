use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// 要約プロバイダへの送信ペーサー
///
/// 同時に実行する処理は1件のみ。連続する処理の開始間隔を min_interval 以上に保つ。
/// tokio::sync::Mutex の待ち行列は公平（FIFO）なので、投入順に実行される。
/// プロセスごとに1つ生成し、AppState経由で参照共有する。
pub struct ProviderPacer {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl ProviderPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    /// 1件の処理を投入する。先行処理の完了と開始間隔の両方を待ってから実行する。
    pub async fn run<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last_start = Some(Instant::now());
        // ガードを保持したまま実行する（実行中は後続を待たせる）
        task().await
    }
}

/// リマインダーメール送信用のレートリミッター設定
pub struct ReminderRateLimiter {
    // メールアドレスごとのレート制限（15分間に2回まで）
    per_email: Arc<RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>>,
}

impl ReminderRateLimiter {
    pub fn new() -> Self {
        let email_quota = Quota::with_period(Duration::from_secs(15 * 60))
            .unwrap()
            .allow_burst(NonZeroU32::new(2).unwrap());
        let per_email = Arc::new(RateLimiter::dashmap(email_quota));

        Self { per_email }
    }

    /// Check if reminder sending is allowed for this address
    pub fn check_email_limit(&self, email: &str) -> Result<(), String> {
        match self.per_email.check_key(&email.to_string()) {
            Ok(_) => Ok(()),
            Err(negative) => {
                let wait_time = negative.wait_time_from(DefaultClock::default().now());
                let minutes = wait_time.as_secs() / 60;
                let seconds = wait_time.as_secs() % 60;

                let time_msg = if minutes > 0 {
                    format!("{}m {}s", minutes, seconds)
                } else {
                    format!("{}s", seconds)
                };

                Err(format!(
                    "Reminder rate limit exceeded. Please try again in {}.",
                    time_msg
                ))
            }
        }
    }
}

impl Default for ReminderRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_starts_immediately() {
        let pacer = ProviderPacer::new(Duration::from_millis(1000));
        let before = Instant::now();
        let started_at = pacer.run(|| async { Instant::now() }).await;
        assert!(started_at - before < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_are_spaced_apart() {
        let pacer = ProviderPacer::new(Duration::from_millis(1000));
        let (first, second) = tokio::join!(
            pacer.run(|| async { Instant::now() }),
            pacer.run(|| async { Instant::now() }),
        );
        let gap = if second > first {
            second - first
        } else {
            first - second
        };
        assert!(gap >= Duration::from_millis(1000), "gap was {:?}", gap);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_tasks_run_in_submission_order() {
        let pacer = ProviderPacer::new(Duration::from_millis(100));
        let order = Mutex::new(Vec::new());
        tokio::join!(
            pacer.run(|| async { order.lock().await.push(1) }),
            pacer.run(|| async { order.lock().await.push(2) }),
            pacer.run(|| async { order.lock().await.push(3) }),
        );
        assert_eq!(*order.lock().await, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_task_blocks_the_next_submission() {
        // 実行に間隔以上かかる処理の後続は、間隔ではなく完了を待つ
        let pacer = ProviderPacer::new(Duration::from_millis(100));
        let (first_done, second_start) = tokio::join!(
            pacer.run(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Instant::now()
            }),
            pacer.run(|| async { Instant::now() }),
        );
        assert!(second_start >= first_done);
    }

    #[test]
    fn reminder_limiter_blocks_after_burst() {
        let limiter = ReminderRateLimiter::new();
        assert!(limiter.check_email_limit("a@example.com").is_ok());
        assert!(limiter.check_email_limit("a@example.com").is_ok());
        let err = limiter.check_email_limit("a@example.com").unwrap_err();
        assert!(err.contains("try again"));
        // 別のアドレスには影響しない
        assert!(limiter.check_email_limit("b@example.com").is_ok());
    }
}
