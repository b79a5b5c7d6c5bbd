//! Decorative weather particles (clouds, rain, snow, lightning).
//!
//! One animation runs at a time. It owns a spawn timer, an optional flash
//! timer and the set of live particle ids; all three are scoped to a
//! cancellation token so switching conditions leaves nothing behind.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use shamiran_weather::WeatherCondition;

pub type ParticleId = u64;

/// A single decorative element handed to the particle layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub class: &'static str,
    /// Horizontal start position, 0-100% of the container width
    pub left_percent: f32,
    pub size_px: f32,
    pub opacity: f32,
    /// The particle removes itself after this long
    pub lifetime: Duration,
}

/// Where particles are drawn.
pub trait ParticleLayer: Send + Sync {
    fn spawn(&self, particle: &Particle);

    fn remove(&self, id: ParticleId);

    /// Briefly light up the whole scene.
    fn flash(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashProfile {
    pub every: Duration,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleProfile {
    pub class: &'static str,
    pub max_live: usize,
    pub spawn_every: Duration,
    pub lifetime_ms: (u64, u64),
    pub size_px: (f32, f32),
    pub opacity: (f32, f32),
    pub flash: Option<FlashProfile>,
}

impl ParticleKind {
    /// Animation for a condition string; `None` for clear skies and anything
    /// unrecognized.
    pub fn for_condition(condition: &str) -> Option<Self> {
        match WeatherCondition::parse(condition) {
            WeatherCondition::Clouds
            | WeatherCondition::Mist
            | WeatherCondition::Fog
            | WeatherCondition::Haze => Some(Self::Clouds),
            WeatherCondition::Rain | WeatherCondition::Drizzle => Some(Self::Rain),
            WeatherCondition::Snow => Some(Self::Snow),
            WeatherCondition::Thunderstorm => Some(Self::Thunderstorm),
            WeatherCondition::Clear | WeatherCondition::Other => None,
        }
    }

    pub fn profile(self) -> ParticleProfile {
        match self {
            Self::Clouds => ParticleProfile {
                class: "cloud",
                max_live: 6,
                spawn_every: Duration::from_millis(2500),
                lifetime_ms: (20_000, 35_000),
                size_px: (60.0, 140.0),
                opacity: (0.3, 0.7),
                flash: None,
            },
            Self::Rain => ParticleProfile {
                class: "raindrop",
                max_live: 60,
                spawn_every: Duration::from_millis(60),
                lifetime_ms: (600, 1200),
                size_px: (1.0, 2.0),
                opacity: (0.4, 0.8),
                flash: None,
            },
            Self::Snow => ParticleProfile {
                class: "snowflake",
                max_live: 40,
                spawn_every: Duration::from_millis(200),
                lifetime_ms: (6_000, 12_000),
                size_px: (3.0, 8.0),
                opacity: (0.6, 1.0),
                flash: None,
            },
            Self::Thunderstorm => ParticleProfile {
                class: "raindrop",
                max_live: 70,
                spawn_every: Duration::from_millis(50),
                lifetime_ms: (500, 1000),
                size_px: (1.0, 2.0),
                opacity: (0.5, 0.9),
                flash: Some(FlashProfile {
                    every: Duration::from_secs(2),
                    probability: 0.3,
                }),
            },
        }
    }
}

/// Snapshot of the running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationStatus {
    pub kind: Option<ParticleKind>,
    pub live_particles: usize,
    /// Spawn and flash timers still running
    pub running_timers: usize,
    /// Per-particle removal timers still pending
    pub pending_removals: usize,
}

struct Animation {
    kind: ParticleKind,
    cancel: CancellationToken,
    timers: Vec<JoinHandle<()>>,
    live: Arc<Mutex<HashSet<ParticleId>>>,
}

pub struct ParticleManager {
    layer: Arc<dyn ParticleLayer>,
    runtime: Handle,
    enabled: bool,
    next_id: Arc<AtomicU64>,
    pending_removals: Arc<AtomicUsize>,
    active: Mutex<Option<Animation>>,
}

impl ParticleManager {
    pub fn new(layer: Arc<dyn ParticleLayer>, runtime: Handle, enabled: bool) -> Self {
        Self {
            layer,
            runtime,
            enabled,
            next_id: Arc::new(AtomicU64::new(1)),
            pending_removals: Arc::new(AtomicUsize::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Replace the running animation with the one for `condition`.
    ///
    /// The previous animation's timers are cancelled and its particles
    /// removed before this returns.
    pub fn set_condition(&self, condition: &str) {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            self.stop(previous);
        }

        if !self.enabled {
            return;
        }

        match ParticleKind::for_condition(condition) {
            Some(kind) => {
                tracing::debug!("Starting {:?} particles for '{}'", kind, condition);
                *active = Some(self.start(kind));
            }
            None => tracing::debug!("No particles for '{}'", condition),
        }
    }

    /// Stop the running animation, if any.
    pub fn clear(&self) {
        if let Some(previous) = self.active.lock().take() {
            self.stop(previous);
        }
    }

    pub fn status(&self) -> AnimationStatus {
        let active = self.active.lock();
        let pending_removals = self.pending_removals.load(Ordering::SeqCst);
        match active.as_ref() {
            Some(animation) => AnimationStatus {
                kind: Some(animation.kind),
                live_particles: animation.live.lock().len(),
                running_timers: animation.timers.iter().filter(|t| !t.is_finished()).count(),
                pending_removals,
            },
            None => AnimationStatus {
                kind: None,
                live_particles: 0,
                running_timers: 0,
                pending_removals,
            },
        }
    }

    fn start(&self, kind: ParticleKind) -> Animation {
        let profile = kind.profile();
        let cancel = CancellationToken::new();
        let live = Arc::new(Mutex::new(HashSet::new()));

        let mut timers = vec![self.runtime.spawn(spawn_loop(
            profile,
            cancel.clone(),
            live.clone(),
            self.layer.clone(),
            self.next_id.clone(),
            self.pending_removals.clone(),
        ))];

        if let Some(flash) = profile.flash {
            timers.push(self.runtime.spawn(flash_loop(
                flash,
                cancel.clone(),
                live.clone(),
                self.layer.clone(),
            )));
        }

        Animation {
            kind,
            cancel,
            timers,
            live,
        }
    }

    fn stop(&self, animation: Animation) {
        animation.cancel.cancel();
        for timer in &animation.timers {
            timer.abort();
        }

        let ids: Vec<ParticleId> = animation.live.lock().drain().collect();
        for id in &ids {
            self.layer.remove(*id);
        }
        tracing::debug!(
            "Stopped {:?} particles, removed {} nodes",
            animation.kind,
            ids.len()
        );
    }
}

impl Drop for ParticleManager {
    fn drop(&mut self) {
        self.clear();
    }
}

fn random_particle(id: ParticleId, profile: &ParticleProfile) -> Particle {
    let mut rng = rand::rng();
    Particle {
        id,
        class: profile.class,
        left_percent: rng.random_range(0.0..=100.0),
        size_px: rng.random_range(profile.size_px.0..=profile.size_px.1),
        opacity: rng.random_range(profile.opacity.0..=profile.opacity.1),
        lifetime: Duration::from_millis(
            rng.random_range(profile.lifetime_ms.0..=profile.lifetime_ms.1),
        ),
    }
}

/// Decrements the pending-removal count however the removal task ends.
struct PendingRemoval(Arc<AtomicUsize>);

impl PendingRemoval {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingRemoval {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn spawn_loop(
    profile: ParticleProfile,
    cancel: CancellationToken,
    live: Arc<Mutex<HashSet<ParticleId>>>,
    layer: Arc<dyn ParticleLayer>,
    next_id: Arc<AtomicU64>,
    pending_removals: Arc<AtomicUsize>,
) {
    let mut ticker = tokio::time::interval(profile.spawn_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let particle = {
            // Spawning under the live-set lock keeps stop() from missing a node
            let mut live_ids = live.lock();
            if cancel.is_cancelled() {
                break;
            }
            if live_ids.len() >= profile.max_live {
                continue;
            }
            let particle = random_particle(next_id.fetch_add(1, Ordering::SeqCst), &profile);
            live_ids.insert(particle.id);
            layer.spawn(&particle);
            particle
        };

        let pending = PendingRemoval::new(pending_removals.clone());
        let cancel = cancel.clone();
        let live = live.clone();
        let layer = layer.clone();
        tokio::spawn(async move {
            let _pending = pending;
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(particle.lifetime) => {
                    let mut live_ids = live.lock();
                    if live_ids.remove(&particle.id) {
                        layer.remove(particle.id);
                    }
                }
            }
        });
    }
}

async fn flash_loop(
    flash: FlashProfile,
    cancel: CancellationToken,
    live: Arc<Mutex<HashSet<ParticleId>>>,
    layer: Arc<dyn ParticleLayer>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + flash.every, flash.every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let strike = rand::rng().random_bool(flash.probability);
        {
            let _live_ids = live.lock();
            if cancel.is_cancelled() {
                break;
            }
            if strike {
                layer.flash();
            }
        }
    }
}
