/**
 * Bulk Digest Job
 *
 * Each run walks one window `(watermark, now]`:
 *
 * 1. Look up products created in the window. If the lookup fails the run
 *    stops and the watermark stays put, so the same window is tried again.
 * 2. No products: advance the watermark and stop.
 * 3. Look up recipients. If that fails the run stops before any send but
 *    the watermark still advances.
 * 4. Render one payload and spawn one pool unit per recipient with a
 *    usable address. Units are not awaited; their failures end in the log.
 * 5. Advance the watermark to the `now` captured at the start of the run.
 *
 * The watermark mutex is held for the whole run, so runs never overlap.
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::backend::catalog::DigestSource;
use crate::backend::digest::mailer::Mailer;
use crate::backend::digest::payload::DigestPayload;
use crate::backend::worker::WorkerPool;

/// How a digest run ended
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DigestOutcome {
    /// Nothing new in the window
    NoDelta,
    /// A digest was rendered and sends were scheduled
    Dispatched,
    /// Recipients could not be loaded; watermark advanced anyway
    RecipientLookupFailed,
    /// New products could not be loaded; watermark unchanged
    DeltaQueryFailed,
}

/// Summary of one run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DigestRunReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub new_products: usize,
    /// Sends scheduled on the worker pool
    pub dispatched: usize,
    /// Recipients without a usable address
    pub skipped: usize,
    pub outcome: DigestOutcome,
}

impl DigestRunReport {
    fn empty(window_start: DateTime<Utc>, window_end: DateTime<Utc>, outcome: DigestOutcome) -> Self {
        Self {
            window_start,
            window_end,
            new_products: 0,
            dispatched: 0,
            skipped: 0,
            outcome,
        }
    }
}

pub struct BulkDigestJob {
    source: Arc<dyn DigestSource>,
    mailer: Arc<dyn Mailer>,
    pool: WorkerPool,
    watermark: Mutex<DateTime<Utc>>,
}

impl BulkDigestJob {
    /// Create a job whose first window starts after `watermark`
    pub fn new(
        source: Arc<dyn DigestSource>,
        mailer: Arc<dyn Mailer>,
        pool: WorkerPool,
        watermark: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            mailer,
            pool,
            watermark: Mutex::new(watermark),
        }
    }

    /// Wait until every scheduled mail has finished
    pub async fn wait_idle(&self) {
        self.pool.wait_idle().await;
    }

    /// Current watermark; waits for an in-flight run to finish
    pub async fn watermark(&self) -> DateTime<Utc> {
        *self.watermark.lock().await
    }

    /// Run with the wall clock as the cutoff
    pub async fn run(&self) -> DigestRunReport {
        self.run_at(Utc::now()).await
    }

    /// Run with an explicit cutoff
    pub async fn run_at(&self, now: DateTime<Utc>) -> DigestRunReport {
        let mut watermark = self.watermark.lock().await;
        let window_start = *watermark;

        // A cutoff at or before the watermark would move it backwards
        if now <= window_start {
            tracing::warn!(
                "[Digest] Cutoff {} is not after watermark {}, skipping run",
                now,
                window_start
            );
            return DigestRunReport::empty(window_start, window_start, DigestOutcome::NoDelta);
        }

        let delta = match self.source.find_products_created_between(window_start, now).await {
            Ok(delta) => delta,
            Err(e) => {
                tracing::error!(
                    "[Digest] Failed to load products for ({}, {}]: {}",
                    window_start,
                    now,
                    e
                );
                return DigestRunReport::empty(window_start, now, DigestOutcome::DeltaQueryFailed);
            }
        };

        if delta.is_empty() {
            *watermark = now;
            tracing::info!("[Digest] No new products in ({}, {}]", window_start, now);
            return DigestRunReport::empty(window_start, now, DigestOutcome::NoDelta);
        }

        let recipients = match self.source.find_all_recipients().await {
            Ok(recipients) => recipients,
            Err(e) => {
                *watermark = now;
                tracing::error!(
                    "[Digest] Failed to load recipients, dropping digest of {} products: {}",
                    delta.len(),
                    e
                );
                return DigestRunReport {
                    new_products: delta.len(),
                    ..DigestRunReport::empty(window_start, now, DigestOutcome::RecipientLookupFailed)
                };
            }
        };

        let payload = Arc::new(DigestPayload::build(&delta, recipients));
        let (dispatched, skipped) = self.dispatch(&payload);
        *watermark = now;

        tracing::info!(
            "[Digest] {} new products, {} mails scheduled, {} recipients skipped",
            delta.len(),
            dispatched,
            skipped
        );

        DigestRunReport {
            window_start,
            window_end: now,
            new_products: delta.len(),
            dispatched,
            skipped,
            outcome: DigestOutcome::Dispatched,
        }
    }

    fn dispatch(&self, payload: &Arc<DigestPayload>) -> (usize, usize) {
        let mut dispatched = 0;
        let mut skipped = 0;

        for recipient in &payload.recipients {
            let Some(address) = recipient.deliverable_address() else {
                tracing::debug!("[Digest] User {} has no address, skipping", recipient.user_id);
                skipped += 1;
                continue;
            };

            let address = address.to_string();
            let mailer = Arc::clone(&self.mailer);
            let payload = Arc::clone(payload);
            self.pool.spawn(format!("digest mail to user {}", recipient.user_id), async move {
                mailer
                    .send_message(&address, &payload.subject, &payload.body)
                    .await
            });
            dispatched += 1;
        }

        (dispatched, skipped)
    }

    /// Run the job every `period`, starting one period from now
    pub fn spawn_schedule(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let report = self.run().await;
                tracing::debug!("[Digest] Scheduled run finished: {:?}", report.outcome);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::catalog::{MemoryCatalogStore, StoreError};
    use crate::backend::digest::mailer::MailError;
    use crate::shared::{Product, Recipient, User};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    /// Mailer that records every attempt and fails for chosen addresses
    #[derive(Default)]
    struct RecordingMailer {
        attempts: std::sync::Mutex<Vec<String>>,
        failing: HashSet<String>,
    }

    impl RecordingMailer {
        fn failing_for(addresses: &[&str]) -> Self {
            Self {
                failing: addresses.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }

        fn attempts(&self) -> Vec<String> {
            let mut attempts = self.attempts.lock().unwrap().clone();
            attempts.sort();
            attempts
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_message(&self, to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
            self.attempts.lock().unwrap().push(to.to_string());
            if self.failing.contains(to) {
                return Err(MailError::SendFailed(format!("mailbox {} unavailable", to)));
            }
            Ok(())
        }
    }

    /// Store wrapper with switchable lookup failures
    #[derive(Default)]
    struct FlakySource {
        inner: MemoryCatalogStore,
        fail_delta: AtomicBool,
        fail_recipients: AtomicBool,
    }

    fn unavailable() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl DigestSource for FlakySource {
        async fn find_products_created_between(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<Product>, StoreError> {
            if self.fail_delta.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.find_products_created_between(from, to).await
        }

        async fn find_all_recipients(&self) -> Result<Vec<Recipient>, StoreError> {
            if self.fail_recipients.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.find_all_recipients().await
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn product(name: &str, created_at: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price_cents: 1000,
            category_id: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn user(name: &str, email: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.map(str::to_string),
            created_at: at(0, 0),
        }
    }

    struct Fixture {
        source: Arc<FlakySource>,
        mailer: Arc<RecordingMailer>,
        pool: WorkerPool,
        job: BulkDigestJob,
    }

    fn fixture(mailer: RecordingMailer, watermark: DateTime<Utc>) -> Fixture {
        let source = Arc::new(FlakySource::default());
        let mailer = Arc::new(mailer);
        let pool = WorkerPool::new(4);
        let job = BulkDigestJob::new(source.clone(), mailer.clone(), pool.clone(), watermark);
        Fixture { source, mailer, pool, job }
    }

    #[tokio::test]
    async fn test_empty_delta_advances_watermark_without_sends() {
        let f = fixture(RecordingMailer::default(), at(8, 0));
        f.source.inner.insert_user(user("Ada", Some("ada@example.com"))).await;

        let report = f.job.run_at(at(10, 0)).await;
        f.pool.wait_idle().await;

        assert_eq!(report.outcome, DigestOutcome::NoDelta);
        assert_eq!(report.dispatched, 0);
        assert_eq!(f.job.watermark().await, at(10, 0));
        assert!(f.mailer.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_k_eligible_recipients_get_k_sends() {
        let f = fixture(RecordingMailer::default(), at(8, 0));
        f.source.inner.insert_product(product("Lamp", at(9, 0))).await;
        for (name, email) in [
            ("Ada", Some("ada@example.com")),
            ("Bob", Some("bob@example.com")),
            ("Cy", Some(" cy@example.com ")),
            ("Dee", Some("   ")),
            ("Eve", Some("")),
            ("Fay", None),
        ] {
            f.source.inner.insert_user(user(name, email)).await;
        }

        let report = f.job.run_at(at(10, 0)).await;
        f.pool.wait_idle().await;

        assert_eq!(report.outcome, DigestOutcome::Dispatched);
        assert_eq!(report.dispatched, 3);
        assert_eq!(report.skipped, 3);
        assert_eq!(
            f.mailer.attempts(),
            vec!["ada@example.com", "bob@example.com", "cy@example.com"]
        );
    }

    #[tokio::test]
    async fn test_one_failing_recipient_does_not_affect_others() {
        let f = fixture(RecordingMailer::failing_for(&["bob@example.com"]), at(8, 0));
        f.source.inner.insert_product(product("Lamp", at(9, 0))).await;
        for (name, email) in [
            ("Ada", "ada@example.com"),
            ("Bob", "bob@example.com"),
            ("Cy", "cy@example.com"),
        ] {
            f.source.inner.insert_user(user(name, Some(email))).await;
        }

        let report = f.job.run_at(at(10, 0)).await;
        f.pool.wait_idle().await;

        assert_eq!(report.dispatched, 3);
        assert_eq!(f.mailer.attempts().len(), 3);
        assert_eq!(f.job.watermark().await, at(10, 0));
    }

    #[tokio::test]
    async fn test_two_runs_example() {
        let f = fixture(RecordingMailer::default(), at(8, 0));
        f.source.inner.insert_product(product("A", at(9, 0))).await;
        f.source.inner.insert_product(product("B", at(9, 5))).await;
        f.source.inner.insert_user(user("Ada", Some("ada@example.com"))).await;

        let first = f.job.run_at(at(10, 0)).await;
        f.pool.wait_idle().await;
        assert_eq!(first.new_products, 2);
        assert_eq!(first.dispatched, 1);
        assert_eq!(f.job.watermark().await, at(10, 0));

        let second = f.job.run_at(at(11, 0)).await;
        f.pool.wait_idle().await;
        assert_eq!(second.outcome, DigestOutcome::NoDelta);
        assert_eq!(second.window_start, at(10, 0));
        assert_eq!(f.mailer.attempts().len(), 1);
        assert_eq!(f.job.watermark().await, at(11, 0));
    }

    #[tokio::test]
    async fn test_recipient_lookup_failure_still_advances_watermark() {
        let f = fixture(RecordingMailer::default(), at(8, 0));
        f.source.inner.insert_product(product("Lamp", at(9, 0))).await;
        f.source.inner.insert_user(user("Ada", Some("ada@example.com"))).await;
        f.source.fail_recipients.store(true, Ordering::SeqCst);

        let report = f.job.run_at(at(10, 0)).await;
        f.pool.wait_idle().await;

        assert_eq!(report.outcome, DigestOutcome::RecipientLookupFailed);
        assert_eq!(report.new_products, 1);
        assert!(f.mailer.attempts().is_empty());
        assert_eq!(f.job.watermark().await, at(10, 0));
    }

    #[tokio::test]
    async fn test_delta_failure_keeps_window_for_retry() {
        let f = fixture(RecordingMailer::default(), at(8, 0));
        f.source.inner.insert_product(product("Lamp", at(9, 0))).await;
        f.source.inner.insert_user(user("Ada", Some("ada@example.com"))).await;
        f.source.fail_delta.store(true, Ordering::SeqCst);

        let report = f.job.run_at(at(10, 0)).await;
        assert_eq!(report.outcome, DigestOutcome::DeltaQueryFailed);
        assert_eq!(f.job.watermark().await, at(8, 0));

        f.source.fail_delta.store(false, Ordering::SeqCst);
        let retry = f.job.run_at(at(11, 0)).await;
        f.pool.wait_idle().await;
        assert_eq!(retry.new_products, 1);
        assert_eq!(f.mailer.attempts(), vec!["ada@example.com"]);
    }

    #[tokio::test]
    async fn test_stale_cutoff_does_not_rewind_watermark() {
        let f = fixture(RecordingMailer::default(), at(10, 0));
        let report = f.job.run_at(at(9, 0)).await;

        assert_eq!(report.outcome, DigestOutcome::NoDelta);
        assert_eq!(f.job.watermark().await, at(10, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_runs_count_each_product_once() {
        let f = fixture(RecordingMailer::default(), at(8, 0));
        f.source.inner.insert_product(product("Lamp", at(9, 0))).await;
        f.source.inner.insert_user(user("Ada", Some("ada@example.com"))).await;

        let (a, b) = tokio::join!(f.job.run_at(at(10, 0)), f.job.run_at(at(10, 0)));
        f.pool.wait_idle().await;

        assert_eq!(a.new_products + b.new_products, 1);
        assert_eq!(f.mailer.attempts().len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_consecutive_runs_partition_products(
            created in prop::collection::vec(1i64..600, 0..40),
            mut cutoffs in prop::collection::vec(1i64..720, 1..8),
        ) {
            cutoffs.sort_unstable();
            let start = at(8, 0);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let (counted, expected) = runtime.block_on(async {
                let f = fixture(RecordingMailer::default(), start);
                for minutes in &created {
                    f.source.inner.insert_product(product("p", start + chrono::Duration::minutes(*minutes))).await;
                }

                let mut counted = 0;
                for minutes in &cutoffs {
                    counted += f.job.run_at(start + chrono::Duration::minutes(*minutes)).await.new_products;
                }

                let last = cutoffs[cutoffs.len() - 1];
                let expected = created.iter().filter(|m| **m <= last).count();
                (counted, expected)
            });

            prop_assert_eq!(counted, expected);
        }
    }
}
