//! Nation engine
//!
//! Owns every active nation together with its current issue and scheduler
//! state, the storage backend, the optional external generator and the RNG.
//!
//! Issue generation is split in three so the slow part never borrows the
//! engine:
//!
//! 1. [`NationEngine::begin_issue`] snapshots the nation and marks the
//!    generation as in flight.
//! 2. [`GenerationJob::run`] awaits the pipeline on the snapshot.
//! 3. [`NationEngine::finish_issue`] commits the result.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::time::Instant;

use crate::core::config::EngineConfig;
use crate::core::error::{NationError, Result};
use crate::core::types::{nation_id, Slot};
use crate::crisis::arc::CrisisArc;
use crate::crisis::engine::build_map_crises;
use crate::decision::resolve::{resolve_decision, DecisionReport};
use crate::issue::pipeline::{expand, generate_issue, interpret, GeneratedIssue, PipelineInput};
use crate::issue::types::{Issue, IssueOption};
use crate::llm::client::{GeneratorClient, TextGenerator};
use crate::nation::{Nation, NewNation};
use crate::persistence::debounce::SaveDebouncer;
use crate::persistence::record::NationRecord;
use crate::persistence::store::NationStore;
use crate::session::scheduler::{tick, SchedulerState, TickReport};

/// One loaded nation
#[derive(Debug, Clone)]
pub struct NationSession {
    pub nation: Nation,
    pub current_issue: Option<Issue>,
    pub scheduler: SchedulerState,
    /// When the next background tick is due
    pub next_tick_at: Option<Instant>,
}

impl NationSession {
    fn new(nation: Nation) -> Self {
        Self {
            nation,
            current_issue: None,
            scheduler: SchedulerState::new(),
            next_tick_at: None,
        }
    }
}

/// A generation cycle detached from the engine
pub struct GenerationJob<G> {
    pub user_id: String,
    pub slot: Slot,
    input: PipelineInput,
    generator: Option<Arc<G>>,
    rng: ChaCha8Rng,
    config: EngineConfig,
}

/// A finished generation cycle, ready for [`NationEngine::finish_issue`]
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub user_id: String,
    pub slot: Slot,
    pub generated: GeneratedIssue,
}

impl<G: TextGenerator> GenerationJob<G> {
    pub async fn run(mut self) -> GenerationOutcome {
        let generated =
            generate_issue(&self.input, self.generator.as_deref(), &mut self.rng, &self.config)
                .await;
        GenerationOutcome {
            user_id: self.user_id,
            slot: self.slot,
            generated,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct NationEngine<S, G = GeneratorClient> {
    config: EngineConfig,
    store: S,
    generator: Option<Arc<G>>,
    sessions: AHashMap<String, NationSession>,
    saves: SaveDebouncer<Nation>,
    rng: ChaCha8Rng,
}

impl<S: NationStore, G: TextGenerator> NationEngine<S, G> {
    pub fn new(store: S, generator: Option<G>, config: EngineConfig, seed: u64) -> Self {
        let window = config.save_debounce();
        Self {
            config,
            store,
            generator: generator.map(Arc::new),
            sessions: AHashMap::new(),
            saves: SaveDebouncer::new(window),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    fn session(&self, user_id: &str, slot: Slot) -> Result<&NationSession> {
        self.sessions
            .get(&nation_id(user_id, slot))
            .ok_or_else(|| NationError::NoNation {
                user_id: user_id.to_string(),
                slot: slot.get(),
            })
    }

    fn session_mut(&mut self, user_id: &str, slot: Slot) -> Result<&mut NationSession> {
        self.sessions
            .get_mut(&nation_id(user_id, slot))
            .ok_or_else(|| NationError::NoNation {
                user_id: user_id.to_string(),
                slot: slot.get(),
            })
    }

    fn schedule_save(&mut self, user_id: &str, slot: Slot) {
        let id = nation_id(user_id, slot);
        if let Some(session) = self.sessions.get(&id) {
            self.saves.schedule(id, session.nation.clone(), Instant::now());
        }
    }

    // === LIFECYCLE ===

    /// Found a new nation in a slot, replacing whatever was there
    pub fn create_nation(&mut self, new: NewNation) -> Result<&Nation> {
        let user_id = new.user_id.clone();
        let slot = new.slot;
        let nation = Nation::create(new, unix_now(), &self.config);
        self.store.save(&NationRecord::from_nation(&nation)?)?;
        tracing::info!("Founded {} ({})", nation.name, nation.id);

        let id = nation.id.clone();
        self.saves.cancel(&id);
        self.sessions.insert(id, NationSession::new(nation));
        self.nation(&user_id, slot)
    }

    /// Make a stored nation active; already active nations are returned as they are
    pub fn load_nation(&mut self, user_id: &str, slot: Slot) -> Result<&Nation> {
        let id = nation_id(user_id, slot);
        if !self.sessions.contains_key(&id) {
            let record = self
                .store
                .load(user_id, slot)?
                .ok_or_else(|| NationError::NoNation {
                    user_id: user_id.to_string(),
                    slot: slot.get(),
                })?;
            let nation = record.into_nation(&self.config);
            tracing::info!("Loaded {} ({})", nation.name, id);
            self.sessions.insert(id, NationSession::new(nation));
        }
        self.nation(user_id, slot)
    }

    pub fn delete_nation(&mut self, user_id: &str, slot: Slot) -> Result<bool> {
        let id = nation_id(user_id, slot);
        self.sessions.remove(&id);
        self.saves.cancel(&id);
        let removed = self.store.delete(user_id, slot)?;
        if removed {
            tracing::info!("Deleted nation {}", id);
        }
        Ok(removed)
    }

    pub fn list_slots(&self, user_id: &str) -> Result<Vec<Slot>> {
        self.store.list_slots(user_id)
    }

    pub fn nation(&self, user_id: &str, slot: Slot) -> Result<&Nation> {
        Ok(&self.session(user_id, slot)?.nation)
    }

    pub fn current_issue(&self, user_id: &str, slot: Slot) -> Result<Option<&Issue>> {
        Ok(self.session(user_id, slot)?.current_issue.as_ref())
    }

    pub fn scheduler(&self, user_id: &str, slot: Slot) -> Result<&SchedulerState> {
        Ok(&self.session(user_id, slot)?.scheduler)
    }

    pub fn map_crises(&self, user_id: &str, slot: Slot) -> Result<Vec<CrisisArc>> {
        Ok(build_map_crises(&self.nation(user_id, slot)?.crisis_arcs, &self.config))
    }

    // === ISSUE GENERATION ===

    /// Snapshot the nation and mark a generation as in flight
    pub fn begin_issue(&mut self, user_id: &str, slot: Slot) -> Result<GenerationJob<G>> {
        let job_seed: u64 = self.rng.gen();
        let config = self.config.clone();
        let generator = self.generator.clone();

        let session = self.session_mut(user_id, slot)?;
        if session.scheduler.generating {
            return Err(NationError::GenerationInFlight(session.nation.id.clone()));
        }
        session.scheduler.generating = true;
        let input = PipelineInput::snapshot(&session.nation, &session.scheduler.seen_forced, &config);

        Ok(GenerationJob {
            user_id: user_id.to_string(),
            slot,
            input,
            generator,
            rng: ChaCha8Rng::seed_from_u64(job_seed),
            config,
        })
    }

    /// Commit a generated issue as the nation's current issue
    pub fn finish_issue(&mut self, outcome: GenerationOutcome) -> Result<&Issue> {
        let config = self.config.clone();
        let GenerationOutcome {
            user_id,
            slot,
            generated,
        } = outcome;

        let session = self.session_mut(&user_id, slot)?;
        session.scheduler.generating = false;
        match &generated.forced_key {
            Some(key) => {
                session.scheduler.seen_forced.insert(key.clone());
            }
            None if !generated.issue.is_map_event => {
                session.nation.remember_title(&generated.issue.title, &config);
            }
            None => {}
        }
        tracing::info!(
            "{}: new issue \"{}\" ({})",
            session.nation.name,
            generated.issue.title,
            generated.strategy.name()
        );
        session.current_issue = Some(generated.issue);

        self.schedule_save(&user_id, slot);
        let session = self.session(&user_id, slot)?;
        session
            .current_issue
            .as_ref()
            .ok_or_else(|| NationError::NoCurrentIssue(session.nation.id.clone()))
    }

    /// Release the in-flight flag without committing anything
    pub fn cancel_issue(&mut self, user_id: &str, slot: Slot) -> Result<()> {
        self.session_mut(user_id, slot)?.scheduler.generating = false;
        Ok(())
    }

    /// Begin, run and finish one generation cycle
    pub async fn next_issue(&mut self, user_id: &str, slot: Slot) -> Result<&Issue> {
        let job = self.begin_issue(user_id, slot)?;
        let outcome = job.run().await;
        self.finish_issue(outcome)
    }

    // === DECISIONS ===

    /// Resolve an option of the current issue
    pub fn resolve(&mut self, user_id: &str, slot: Slot, option_id: &str) -> Result<DecisionReport> {
        let config = self.config.clone();
        let session = self.session_mut(user_id, slot)?;
        if session.scheduler.generating {
            return Err(NationError::GenerationInFlight(session.nation.id.clone()));
        }
        let issue = session
            .current_issue
            .as_ref()
            .ok_or_else(|| NationError::NoCurrentIssue(session.nation.id.clone()))?;

        let resolution = resolve_decision(&session.nation, issue, option_id, &config)?;
        session.nation = resolution.nation;
        session.current_issue = None;

        let report = resolution.report;
        for arc_id in report.crisis.resolved.iter().chain(&report.crisis.breakdowns) {
            let prefix = format!("{}@", arc_id);
            session.scheduler.seen_forced.retain(|key| !key.starts_with(&prefix));
        }
        if !report.crisis.breakdowns.is_empty() {
            tracing::warn!(
                "{}: {} crisis arc(s) broke down",
                session.nation.name,
                report.crisis.breakdowns.len()
            );
        }
        self.schedule_save(user_id, slot);
        Ok(report)
    }

    /// Turn a free-text response into a `custom-{n}` option on the current issue
    pub async fn interpret_response(
        &mut self,
        user_id: &str,
        slot: Slot,
        user_response: &str,
    ) -> Result<IssueOption> {
        let session = self.session(user_id, slot)?;
        let issue = session
            .current_issue
            .clone()
            .ok_or_else(|| NationError::NoCurrentIssue(session.nation.id.clone()))?;
        let nation = session.nation.clone();

        let mut option = interpret(
            self.generator.as_deref(),
            &nation,
            &issue,
            user_response,
            &self.config,
        )
        .await;

        let session = self.session_mut(user_id, slot)?;
        let current = session
            .current_issue
            .as_mut()
            .ok_or_else(|| NationError::NoCurrentIssue(session.nation.id.clone()))?;
        let n = current
            .options
            .iter()
            .filter(|o| o.id.starts_with("custom-"))
            .count()
            + 1;
        option.id = format!("custom-{}", n);
        current.options.push(option.clone());
        Ok(option)
    }

    /// Ask for more options on the current issue
    pub async fn expand_current_issue(&mut self, user_id: &str, slot: Slot) -> Result<&Issue> {
        let session = self.session(user_id, slot)?;
        let issue = session
            .current_issue
            .clone()
            .ok_or_else(|| NationError::NoCurrentIssue(session.nation.id.clone()))?;
        let nation = session.nation.clone();

        let expanded = expand(self.generator.as_deref(), &nation, &issue, &self.config).await;

        let session = self.session_mut(user_id, slot)?;
        session.current_issue = Some(expanded);
        let session = self.session(user_id, slot)?;
        session
            .current_issue
            .as_ref()
            .ok_or_else(|| NationError::NoCurrentIssue(session.nation.id.clone()))
    }

    // === BACKGROUND TIMER ===

    /// Run one background tick now
    pub fn tick(&mut self, user_id: &str, slot: Slot) -> Result<TickReport> {
        let config = self.config.clone();
        let session = self
            .sessions
            .get_mut(&nation_id(user_id, slot))
            .ok_or_else(|| NationError::NoNation {
                user_id: user_id.to_string(),
                slot: slot.get(),
            })?;
        let report = tick(&mut session.scheduler, &mut session.nation, &mut self.rng, &config);
        if report.changed_nation() {
            self.schedule_save(user_id, slot);
        }
        Ok(report)
    }

    /// Run every tick that has come due since the last call
    pub fn catch_up(&mut self, user_id: &str, slot: Slot, now: Instant) -> Result<Vec<TickReport>> {
        let interval = self.config.tick_interval();
        let session = self.session_mut(user_id, slot)?;
        let mut due_at = *session.next_tick_at.get_or_insert(now + interval);

        let mut reports = Vec::new();
        while due_at <= now {
            reports.push(self.tick(user_id, slot)?);
            due_at += interval;
        }
        self.session_mut(user_id, slot)?.next_tick_at = Some(due_at);
        Ok(reports)
    }

    // === SAVING ===

    fn write(&self, nation: &Nation) -> Result<()> {
        self.store.save(&NationRecord::from_nation(nation)?)
    }

    /// Write every save whose window has closed; failures are retried next window
    pub fn flush_due(&mut self, now: Instant) -> usize {
        let mut written = 0;
        for (id, nation) in self.saves.take_due(now) {
            match self.write(&nation) {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!("Saving {} failed, will retry: {}", id, e);
                    self.saves.schedule(id, nation, now);
                }
            }
        }
        written
    }

    /// Write everything still pending, e.g. on shutdown
    pub fn flush_all(&mut self) -> Result<usize> {
        let pending = self.saves.drain_all();
        let count = pending.len();
        for (_, nation) in pending {
            self.write(&nation)?;
        }
        Ok(count)
    }

    pub fn pending_saves(&self) -> usize {
        self.saves.len()
    }
}
