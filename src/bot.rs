//! Pipeline orchestrator.
//!
//! Two always-running stages share one bounded handoff queue:
//!
//! 1. Poll stage — on a fixed cooldown, fetches mentions since the cursor,
//!    parses qualifying ones as poll commands, and enqueues them. A full
//!    queue suspends the stage (backpressure against a slow resolver).
//! 2. Reply stage — dequeues FIFO, resolves each poll through the current
//!    callback, signs the reply and submits it. At-most-once: any failure
//!    drops the request, nothing is queued for retry.
//!
//! A single shutdown signal is observed at every suspension point of both
//! stages; `stop` waits a bounded grace period and then aborts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::error::ConfigError;
use crate::feed::FeedSource;
use crate::feed::mentions::poll_mentions;
use crate::poll::{Poll, parse_poll};
use crate::protocol::Signer;

/// Capacity of the handoff queue between the stages. Capacity 1 is already
/// correct; the extra slots only smooth bursts within one poll cycle.
const QUEUE_CAPACITY: usize = 8;

/// How long `stop` waits for a stage to exit before aborting it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Turns a parsed poll request into reply text.
///
/// Invoked at most once per admitted request. Expected to return promptly
/// or manage its own timeout.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, poll: &Poll) -> anyhow::Result<String>;
}

type SharedResolver = Arc<Mutex<Option<Arc<dyn Resolver>>>>;

/// The mention-to-reply pipeline.
pub struct Bot {
    fid: u64,
    cooldown: Duration,
    signer: Arc<Signer>,
    source: Arc<dyn FeedSource>,
    resolver: SharedResolver,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("fid", &self.fid)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

impl Bot {
    /// Validate the configuration and derive the signing identity.
    pub fn new(config: BotConfig, source: Arc<dyn FeedSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.decode_seed()?;
        let signer = Signer::new(config.fid, &seed)
            .map_err(|e| ConfigError::InvalidSeed(e.to_string()))?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            fid: config.fid,
            cooldown: config.cooldown,
            signer: Arc::new(signer),
            source,
            resolver: Arc::new(Mutex::new(None)),
            shutdown,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Install or replace the poll resolver. Safe to call while the
    /// pipeline is running; in-flight requests keep the callback they
    /// already snapshotted.
    pub async fn set_resolver(&self, resolver: Arc<dyn Resolver>) {
        *self.resolver.lock().await = Some(resolver);
    }

    /// Spawn both stages.
    pub async fn start(&self) {
        let (tx, rx) = mpsc::channel::<Poll>(QUEUE_CAPACITY);

        let poll_handle = tokio::spawn(poll_stage(
            Arc::clone(&self.source),
            tx,
            self.cooldown,
            self.shutdown.subscribe(),
        ));
        let reply_handle = tokio::spawn(reply_stage(
            Arc::clone(&self.source),
            Arc::clone(&self.signer),
            Arc::clone(&self.resolver),
            rx,
            self.shutdown.subscribe(),
        ));

        self.tasks
            .lock()
            .await
            .extend([poll_handle, reply_handle]);
        info!(fid = self.fid, cooldown = ?self.cooldown, "Bot started");
    }

    /// Signal shutdown and wait for both stages, bounded by the grace
    /// period. Undelivered queue items are dropped, never a deadlock.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);
        let mut tasks = self.tasks.lock().await;
        for mut handle in tasks.drain(..) {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle)
                .await
                .is_err()
            {
                warn!("Stage did not exit within grace period, aborting");
                handle.abort();
            }
        }
        if let Err(e) = self.source.shutdown().await {
            warn!(error = %e, "Feed source shutdown failed");
        }
        info!(fid = self.fid, "Bot stopped");
    }
}

/// Poll stage: tick, fetch, filter, parse, enqueue.
async fn poll_stage(
    source: Arc<dyn FeedSource>,
    tx: mpsc::Sender<Poll>,
    cooldown: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    // The cursor starts at zero; the first cycle sweeps whatever the
    // source currently returns. Only this task ever touches it.
    let mut cursor: u64 = 0;
    let mut tick = tokio::time::interval(cooldown);
    // Late ticks are coalesced, not queued.
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = tick.tick() => {}
        }

        debug!(cursor, "Checking for new mentions");
        let batch = match poll_mentions(source.as_ref(), cursor).await {
            Ok(Some(batch)) => batch,
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "Mention poll failed");
                continue;
            }
        };
        cursor = batch.cursor;

        for message in batch.messages {
            let poll = match parse_poll(message.author, &message.hash, &message.content) {
                Ok(poll) => poll,
                Err(e) => {
                    warn!(author = message.author, error = %e, "Mention is not a valid poll");
                    continue;
                }
            };
            info!(author = poll.author, question = %poll.question, "New poll request");
            tokio::select! {
                _ = shutdown.changed() => return,
                sent = tx.send(poll) => {
                    if sent.is_err() {
                        // Reply stage is gone; nothing left to do.
                        return;
                    }
                }
            }
        }
    }
}

/// Reply stage: dequeue FIFO, resolve, sign, submit.
async fn reply_stage(
    source: Arc<dyn FeedSource>,
    signer: Arc<Signer>,
    resolver: SharedResolver,
    mut rx: mpsc::Receiver<Poll>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let poll = tokio::select! {
            _ = shutdown.changed() => return,
            received = rx.recv() => match received {
                Some(poll) => poll,
                None => return,
            }
        };

        // Snapshot the active callback under the lock; a concurrent swap
        // takes effect on the next request.
        let callback = { resolver.lock().await.clone() };
        let Some(callback) = callback else {
            warn!(author = poll.author, "No resolver installed, dropping poll");
            continue;
        };

        let reply_text = match callback.resolve(&poll).await {
            Ok(text) => text,
            Err(e) => {
                error!(author = poll.author, error = %e, "Resolver failed, dropping poll");
                continue;
            }
        };

        let reply = signer.sign_reply(poll.author, &poll.message_hash, &reply_text);
        match source.submit(reply.encode()).await {
            Ok(()) => info!(author = poll.author, "Replied to poll request"),
            Err(e) => {
                // At-most-once delivery: log and drop.
                error!(author = poll.author, error = %e, "Reply submit failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::error::FeedError;
    use crate::feed::FeedMessage;

    fn test_config() -> BotConfig {
        BotConfig {
            fid: 99,
            signer_seed: SecretString::from("11".repeat(32)),
            cooldown: Duration::from_millis(10),
        }
    }

    struct NullSource;

    #[async_trait]
    impl FeedSource for NullSource {
        fn name(&self) -> &str {
            "null"
        }

        async fn fetch_mentions(&self, _since: u64) -> Result<Vec<FeedMessage>, FeedError> {
            Ok(Vec::new())
        }

        async fn submit(&self, _message: Vec<u8>) -> Result<(), FeedError> {
            Ok(())
        }
    }

    #[test]
    fn construction_rejects_zero_fid() {
        let mut config = test_config();
        config.fid = 0;
        let err = Bot::new(config, Arc::new(NullSource)).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroFid));
    }

    #[test]
    fn construction_rejects_missing_seed() {
        let mut config = test_config();
        config.signer_seed = SecretString::from("");
        let err = Bot::new(config, Arc::new(NullSource)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSeed));
    }

    #[test]
    fn construction_rejects_malformed_seed() {
        let mut config = test_config();
        config.signer_seed = SecretString::from("feed");
        let err = Bot::new(config, Arc::new(NullSource)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeed(_)));
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let bot = Bot::new(test_config(), Arc::new(NullSource)).unwrap();
        bot.stop().await;
    }

    #[tokio::test]
    async fn resolver_can_be_swapped() {
        struct Fixed(&'static str);

        #[async_trait]
        impl Resolver for Fixed {
            async fn resolve(&self, _poll: &Poll) -> anyhow::Result<String> {
                Ok(self.0.to_string())
            }
        }

        let bot = Bot::new(test_config(), Arc::new(NullSource)).unwrap();
        bot.set_resolver(Arc::new(Fixed("first"))).await;
        bot.set_resolver(Arc::new(Fixed("second"))).await;

        let snapshot = { bot.resolver.lock().await.clone() }.unwrap();
        let poll = Poll {
            author: 1,
            message_hash: vec![0xaa],
            question: "Q?".into(),
            options: vec!["a".into(), "b".into()],
            duration: Duration::from_secs(3600),
        };
        assert_eq!(snapshot.resolve(&poll).await.unwrap(), "second");
    }
}
