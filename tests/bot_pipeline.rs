//! End-to-end pipeline tests with mocked collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ed25519_dalek::{Signature, SigningKey, Verifier};
use prost::Message as _;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

use pollcast::bot::{Bot, Resolver};
use pollcast::config::BotConfig;
use pollcast::error::FeedError;
use pollcast::feed::{FeedMessage, FeedSource};
use pollcast::poll::Poll;
use pollcast::protocol::wire;

const BOT_FID: u64 = 99;
const SEED_BYTE: u8 = 0x11;
const TARGET_HASH: [u8; 20] = [0xcd; 20];

fn test_config(cooldown_ms: u64) -> BotConfig {
    BotConfig {
        fid: BOT_FID,
        signer_seed: SecretString::from(format!("{:02x}", SEED_BYTE).repeat(32)),
        cooldown: Duration::from_millis(cooldown_ms),
    }
}

/// Feed source that serves one fixed batch forever and streams submissions
/// back to the test.
struct ScriptedSource {
    batch: Vec<FeedMessage>,
    submissions: mpsc::UnboundedSender<Vec<u8>>,
}

#[async_trait]
impl FeedSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_mentions(&self, _since: u64) -> Result<Vec<FeedMessage>, FeedError> {
        Ok(self.batch.clone())
    }

    async fn submit(&self, message: Vec<u8>) -> Result<(), FeedError> {
        self.submissions
            .send(message)
            .map_err(|e| FeedError::Submit(e.to_string()))
    }
}

/// Resolver returning a fixed frame URL, counting invocations.
struct FixedResolver {
    reply: &'static str,
    calls: Arc<Mutex<u32>>,
}

#[async_trait]
impl Resolver for FixedResolver {
    async fn resolve(&self, _poll: &Poll) -> anyhow::Result<String> {
        *self.calls.lock().await += 1;
        Ok(self.reply.to_string())
    }
}

struct FailingResolver;

#[async_trait]
impl Resolver for FailingResolver {
    async fn resolve(&self, _poll: &Poll) -> anyhow::Result<String> {
        anyhow::bail!("frame service unavailable")
    }
}

fn lunch_mention() -> FeedMessage {
    FeedMessage {
        is_mention: true,
        content: "!poll\nLunch?\n- Pizza\n- Salad".into(),
        author: 7,
        hash: TARGET_HASH.to_vec(),
        timestamp: 100,
    }
}

#[tokio::test]
async fn mention_becomes_a_signed_parented_reply() {
    let (tx, mut submissions) = mpsc::unbounded_channel();
    let source = Arc::new(ScriptedSource {
        batch: vec![lunch_mention()],
        submissions: tx,
    });
    let calls = Arc::new(Mutex::new(0));

    let bot = Bot::new(test_config(10), source).unwrap();
    bot.set_resolver(Arc::new(FixedResolver {
        reply: "https://vote/x",
        calls: Arc::clone(&calls),
    }))
    .await;
    bot.start().await;

    let submitted = tokio::time::timeout(Duration::from_secs(2), submissions.recv())
        .await
        .expect("no reply submitted within 2s")
        .expect("submission channel closed");

    // The envelope decodes to a cast-add parented on the source mention,
    // carrying the resolver's text verbatim.
    let envelope = wire::Message::decode(submitted.as_slice()).unwrap();
    assert_eq!(envelope.hash_scheme, wire::HashScheme::Blake3 as i32);
    assert_eq!(
        envelope.signature_scheme,
        wire::SignatureScheme::Ed25519 as i32
    );

    let data_bytes = envelope.data_bytes.expect("data_bytes missing");
    let data = wire::MessageData::decode(data_bytes.as_slice()).unwrap();
    assert_eq!(data.r#type, wire::MessageType::CastAdd as i32);
    assert_eq!(data.fid, BOT_FID);
    assert_eq!(data.network, wire::FarcasterNetwork::Mainnet as i32);

    let Some(wire::message_data::Body::CastAddBody(body)) = data.body else {
        panic!("Expected cast-add body");
    };
    assert_eq!(body.text, "https://vote/x");
    let Some(wire::cast_add_body::Parent::ParentCastId(parent)) = body.parent else {
        panic!("Expected parent cast id");
    };
    assert_eq!(parent.fid, 7);
    assert_eq!(parent.hash, TARGET_HASH.to_vec());

    // Hash covers the payload bytes; the signature covers the hash.
    let digest = blake3::hash(&data_bytes);
    assert_eq!(envelope.hash, digest.as_bytes()[..20].to_vec());
    let key = SigningKey::from_bytes(&[SEED_BYTE; 32]).verifying_key();
    let signature = Signature::from_slice(&envelope.signature).unwrap();
    key.verify(&envelope.hash, &signature).unwrap();
    assert_eq!(envelope.signer, key.to_bytes().to_vec());

    // The cursor advanced past the mention: re-serving the same batch must
    // not produce a second reply.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(submissions.try_recv().is_err());
    assert_eq!(*calls.lock().await, 1);

    bot.stop().await;
}

#[tokio::test]
async fn resolver_failure_drops_the_request_without_retry() {
    let (tx, mut submissions) = mpsc::unbounded_channel();
    let source = Arc::new(ScriptedSource {
        batch: vec![lunch_mention()],
        submissions: tx,
    });

    let bot = Bot::new(test_config(10), source).unwrap();
    bot.set_resolver(Arc::new(FailingResolver)).await;
    bot.start().await;

    // Several poll cycles pass; the failed request is never replayed.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(submissions.try_recv().is_err());

    bot.stop().await;
}

#[tokio::test]
async fn stop_returns_promptly_while_reply_stage_is_idle() {
    let (tx, mut submissions) = mpsc::unbounded_channel();
    let source = Arc::new(ScriptedSource {
        batch: Vec::new(),
        submissions: tx,
    });

    let bot = Bot::new(test_config(10_000), source).unwrap();
    bot.start().await;

    // Reply stage is blocked on an empty queue; poll stage waits on a long
    // timer. Shutdown must still complete well within the grace period.
    tokio::time::sleep(Duration::from_millis(20)).await;
    tokio::time::timeout(Duration::from_secs(2), bot.stop())
        .await
        .expect("stop did not complete within 2s");

    assert!(submissions.try_recv().is_err());
}
