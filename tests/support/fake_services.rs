#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;

use judgeloop::generate::{CandidateImage, GenerateService};
use judgeloop::judge::{JudgeReply, JudgeService, Swipe};
use judgeloop::suggest::{CombineService, FeedbackEntry};
use judgeloop::{
    Config, EngineError, Gender, GoalDirection, ImageData, Persona, PersonaRegistry, Result,
    ServiceKind, Services, Session, Suggestion,
};

/// Smallest payload recognized as PNG, tagged so images compare unequal.
pub fn png(tag: u8) -> ImageData {
    ImageData::from_bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, tag])
        .expect("png fixture")
}

pub fn persona(id: &str) -> Persona {
    Persona {
        id: id.to_string(),
        name: id.to_uppercase(),
        bio: format!("{id} has opinions"),
        avatar_ref: format!("https://avatars.test/{id}.svg"),
        gender: Gender::Female,
        is_custom: false,
    }
}

/// Registry over `ids`, all selected.
pub fn registry(ids: &[&str]) -> PersonaRegistry {
    let mut registry =
        PersonaRegistry::from_catalog(ids.iter().map(|id| persona(id)).collect()).expect("registry");
    for id in ids {
        registry.select(id);
    }
    registry
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.api_key = Some("test-key".into());
    config.judge.timeout_secs = 1;
    config.combiner.timeout_secs = 1;
    config.generator.timeout_secs = 1;
    config
}

/// Lets a test hold a fake call open until it chooses to release it.
#[derive(Clone)]
pub struct Gate {
    entered: Arc<Semaphore>,
    release: Arc<Semaphore>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Semaphore::new(0)),
            release: Arc::new(Semaphore::new(0)),
        }
    }

    async fn pass(&self) {
        self.entered.add_permits(1);
        if let Ok(permit) = self.release.acquire().await {
            permit.forget();
        }
    }

    /// Wait until a call is parked at the gate.
    pub async fn wait_entered(&self) {
        if let Ok(permit) = self.entered.acquire().await {
            permit.forget();
        }
    }

    pub fn open(&self) {
        self.release.add_permits(1_000);
    }
}

#[derive(Clone, Copy)]
pub enum JudgeBehavior {
    Right,
    Left,
    NoSwipe(&'static str),
    Fail,
    Hang,
}

pub struct FakeJudge {
    script: HashMap<String, JudgeBehavior>,
    gate: Option<Gate>,
    pub calls: AtomicUsize,
}

impl FakeJudge {
    pub fn new(script: &[(&str, JudgeBehavior)]) -> Arc<Self> {
        Arc::new(Self {
            script: script.iter().map(|(id, b)| ((*id).to_string(), *b)).collect(),
            gate: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn gated(script: &[(&str, JudgeBehavior)], gate: Gate) -> Arc<Self> {
        Arc::new(Self {
            script: script.iter().map(|(id, b)| ((*id).to_string(), *b)).collect(),
            gate: Some(gate),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl JudgeService for FakeJudge {
    fn name(&self) -> &str {
        "fake"
    }

    fn evaluate<'a>(
        &'a self,
        _image: &'a ImageData,
        persona: &'a Persona,
    ) -> Pin<Box<dyn Future<Output = Result<JudgeReply>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.pass().await;
            }
            let reply = |swipe: Option<Swipe>, content: &str| JudgeReply {
                swipe,
                content: content.to_string(),
                details: None,
            };
            match self.script.get(&persona.id).copied() {
                Some(JudgeBehavior::Right) => Ok(reply(Some(Swipe::Right), "Reason: love it")),
                Some(JudgeBehavior::Left) => Ok(reply(Some(Swipe::Left), "Reason: not for me")),
                Some(JudgeBehavior::NoSwipe(text)) => Ok(reply(None, text)),
                Some(JudgeBehavior::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(reply(Some(Swipe::Right), "too late"))
                }
                Some(JudgeBehavior::Fail) | None => Err(EngineError::transport(
                    ServiceKind::Judge,
                    "connection reset",
                )),
            }
        })
    }
}

pub struct FakeCombiner {
    reply: Suggestion,
    gate: Option<Gate>,
    pub calls: AtomicUsize,
    pub last_goal: std::sync::Mutex<Option<GoalDirection>>,
}

impl FakeCombiner {
    pub fn new(reply: Suggestion) -> Arc<Self> {
        Arc::new(Self {
            reply,
            gate: None,
            calls: AtomicUsize::new(0),
            last_goal: std::sync::Mutex::new(None),
        })
    }

    pub fn gated(reply: Suggestion, gate: Gate) -> Arc<Self> {
        Arc::new(Self {
            reply,
            gate: Some(gate),
            calls: AtomicUsize::new(0),
            last_goal: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CombineService for FakeCombiner {
    fn name(&self) -> &str {
        "fake"
    }

    fn combine<'a>(
        &'a self,
        _feedback: &'a [FeedbackEntry],
        goal: GoalDirection,
    ) -> Pin<Box<dyn Future<Output = Result<Suggestion>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_goal.lock().unwrap() = Some(goal);
            if let Some(gate) = &self.gate {
                gate.pass().await;
            }
            Ok(self.reply.clone())
        })
    }
}

/// Returns `count` data-URL candidates, each a distinct PNG.
pub struct FakeGenerator {
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerateService for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    fn generate<'a>(
        &'a self,
        _directive: &'a str,
        _reference: Option<&'a ImageData>,
        count: u8,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CandidateImage>>> + Send + 'a>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EngineError::transport(ServiceKind::Generator, "boom"));
            }
            Ok((0..count)
                .map(|i| {
                    let tag = u8::try_from(call).unwrap_or(0).wrapping_mul(10).wrapping_add(i);
                    CandidateImage::from(&png(100 + tag))
                })
                .collect())
        })
    }
}

pub struct Fakes {
    pub judge: Arc<FakeJudge>,
    pub combiner: Arc<FakeCombiner>,
    pub generator: Arc<FakeGenerator>,
}

impl Fakes {
    pub fn standard(script: &[(&str, JudgeBehavior)]) -> Self {
        Self {
            judge: FakeJudge::new(script),
            combiner: FakeCombiner::new(Suggestion::new(
                Some("keep the smile".into()),
                "warmer light, tighter crop",
            )),
            generator: FakeGenerator::new(),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            judge: self.judge.clone(),
            combiner: self.combiner.clone(),
            generator: self.generator.clone(),
        }
    }

    /// Session whose panel is exactly the scripted judges.
    pub fn session(&self, ids: &[&str]) -> Session {
        Session::new(&test_config(), self.services(), registry(ids)).expect("session")
    }
}
