use std::time::Instant;

use physics::{Action, ArenaConfig, BotId, BotView, PuckState, RamVerdict};
use sandbox::{GuestFault, SandboxError};

use crate::bot::Bot;
use crate::error::MatchError;
use crate::events::{EventBus, MatchEvent};
use crate::replay::{BotMeta, Frame, Replay};
use crate::result::{EndReason, FaultPhase, FaultRecord, MatchResult};
use crate::rules::MatchRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Init,
    Running,
    Terminal,
}

/// Drives one match: init every bot, then tick until someone wins, everyone
/// is out, or the tick ceiling is reached.
///
/// Bots are always called in the order they were given. Exactly one guest
/// call is in flight at any time.
pub struct MatchEngine<B: Bot> {
    config: ArenaConfig,
    rules: MatchRules,
    bots: Vec<B>,
    /// `pucks[i]` belongs to `bots[i]`.
    pucks: Vec<PuckState>,
    alive: Vec<bool>,
    phase: MatchPhase,
    tick: u64,
    faults: Vec<FaultRecord>,
    result: Option<MatchResult>,
    event_bus: EventBus,
    replay: Option<Replay>,
}

impl<B: Bot> MatchEngine<B> {
    /// Create a match with pucks spawned on the rules' spawn circle.
    pub fn new(config: ArenaConfig, rules: MatchRules, bots: Vec<B>) -> Result<Self, MatchError> {
        let ids: Vec<BotId> = bots.iter().map(|bot| bot.id()).collect();
        let pucks = rules.spawn(&ids);
        Self::with_pucks(config, rules, bots, pucks)
    }

    /// Create a match from explicit starting pucks.
    pub fn with_pucks(
        config: ArenaConfig,
        rules: MatchRules,
        bots: Vec<B>,
        pucks: Vec<PuckState>,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        rules.validate(&config)?;
        if bots.len() < 2 {
            return Err(MatchError::TooFewBots(bots.len()));
        }
        if bots.len() != pucks.len() {
            return Err(MatchError::MismatchedPucks {
                bots: bots.len(),
                pucks: pucks.len(),
            });
        }

        let alive = vec![true; bots.len()];
        Ok(Self {
            config,
            rules,
            bots,
            pucks,
            alive,
            phase: MatchPhase::Init,
            tick: 0,
            faults: Vec::new(),
            result: None,
            event_bus: EventBus::new(),
            replay: None,
        })
    }

    /// Record every tick into a `Replay`, retrievable with `take_replay`.
    pub fn with_replay(mut self) -> Self {
        self.replay = Some(Replay::new(self.config, self.rules));
        self
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Number of ticks executed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn bots(&self) -> &[B] {
        &self.bots
    }

    pub fn pucks(&self) -> &[PuckState] {
        &self.pucks
    }

    pub fn is_alive(&self, bot: BotId) -> bool {
        self.index_of(bot).is_some_and(|i| self.alive[i])
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn take_replay(&mut self) -> Option<Replay> {
        self.replay.take()
    }

    /// Run `init` on every bot, in bot order.
    pub fn start(&mut self) -> Result<(), MatchError> {
        match self.phase {
            MatchPhase::Init => {}
            MatchPhase::Running => return Err(MatchError::AlreadyStarted),
            MatchPhase::Terminal => return Err(MatchError::AlreadyTerminal),
        }

        tracing::info!(
            bots = self.bots.len(),
            boundary_radius = self.config.boundary_radius,
            max_ticks = self.rules.max_ticks,
            "match starting"
        );

        for i in 0..self.bots.len() {
            match self.bots[i].call_init(&self.config) {
                Ok(()) => {}
                Err(SandboxError::Fault(fault)) => self.record_fault(i, FaultPhase::Init, fault),
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(replay) = &mut self.replay {
            replay.bots = self
                .bots
                .iter()
                .map(|bot| BotMeta {
                    id: bot.id(),
                    name: bot.name().to_string(),
                    color: bot.color(),
                })
                .collect();
        }

        self.phase = MatchPhase::Running;
        self.settle(EndReason::Fault);
        self.flush_frame();
        Ok(())
    }

    /// Execute one tick.
    pub fn step(&mut self) -> Result<observability::TickMetrics, MatchError> {
        match self.phase {
            MatchPhase::Init => return Err(MatchError::NotStarted),
            MatchPhase::Terminal => return Err(MatchError::AlreadyTerminal),
            MatchPhase::Running => {}
        }
        let start = Instant::now();
        self.tick += 1;

        // 1. Snapshot views before any guest runs
        let active = self.active_indices();
        let views: Vec<BotView> = active
            .iter()
            .map(|&i| BotView::observe(&self.pucks[i], &self.pucks[self.nearest_enemy(i, &active)]))
            .collect();

        // 2. Guest updates
        let guest_start = Instant::now();
        let mut fuel_used = 0;
        let mut faulted = false;
        for (&i, view) in active.iter().zip(&views) {
            let outcome = self.bots[i].call_update(view);
            fuel_used += self.bots[i].fuel_used();
            match outcome {
                Ok(()) => {}
                Err(SandboxError::Fault(fault)) => {
                    self.record_fault(i, FaultPhase::Update, fault);
                    faulted = true;
                }
                Err(e) => return Err(e.into()),
            }
        }
        let guest_duration = guest_start.elapsed();

        // 3. Physics, skipped entirely on a faulted tick
        if faulted {
            self.settle(EndReason::Fault);
        } else {
            self.advance_physics(&active);
        }

        // 4. Tick ceiling
        if self.phase == MatchPhase::Running && self.tick >= self.rules.max_ticks {
            self.finish(None, EndReason::Timeout);
        }

        let event_count = self.flush_frame();
        Ok(observability::TickMetrics {
            tick_number: self.tick,
            duration_us: start.elapsed().as_micros(),
            guest_duration_us: guest_duration.as_micros(),
            fuel_used,
            active_pucks: self.alive.iter().filter(|alive| **alive).count(),
            event_count,
        })
    }

    /// Step until the match is decided. Starts the match if needed.
    pub fn run(&mut self) -> Result<MatchResult, MatchError> {
        if self.phase == MatchPhase::Init {
            self.start()?;
        } else if self.phase == MatchPhase::Terminal {
            return Err(MatchError::AlreadyTerminal);
        }

        while self.phase == MatchPhase::Running {
            let metrics = self.step()?;
            metrics.log();
        }

        self.result.clone().ok_or(MatchError::NotStarted)
    }

    fn advance_physics(&mut self, active: &[usize]) {
        let actions: Vec<Action> = active.iter().map(|&i| self.bots[i].consume_action()).collect();
        let current: Vec<PuckState> = active.iter().map(|&i| self.pucks[i]).collect();
        let report = physics::step(&current, &actions, &self.config, &self.rules.physics);

        for (&i, puck) in active.iter().zip(&report.pucks) {
            self.pucks[i] = *puck;
        }

        let mut eliminated = Vec::new();
        let mut collided = false;
        for contact in &report.contacts {
            if contact.bounced {
                self.event_bus.emit(MatchEvent::Bounce {
                    first: contact.first,
                    second: contact.second,
                });
                continue;
            }
            collided = true;
            tracing::debug!(
                tick = self.tick,
                first = %contact.first,
                second = %contact.second,
                verdict = ?contact.verdict,
                "pucks collided"
            );
            match contact.verdict {
                RamVerdict::FirstRams => eliminated.push(contact.second),
                RamVerdict::SecondRams => eliminated.push(contact.first),
                RamVerdict::Mutual => eliminated.extend([contact.first, contact.second]),
            }
            self.event_bus.emit(MatchEvent::Collision {
                first: contact.first,
                second: contact.second,
                verdict: contact.verdict,
            });
        }

        for bot in report.exited() {
            tracing::debug!(tick = self.tick, bot = %bot, "puck left the arena");
            eliminated.push(bot);
            self.event_bus.emit(MatchEvent::BoundaryExit { bot });
        }

        if eliminated.is_empty() {
            return;
        }
        // All of this tick's eliminations land together.
        for bot in eliminated {
            if let Some(i) = self.index_of(bot) {
                self.alive[i] = false;
            }
        }
        let reason = if collided {
            EndReason::Collision
        } else {
            EndReason::BoundaryExit
        };
        self.settle(reason);
    }

    fn record_fault(&mut self, index: usize, phase: FaultPhase, fault: GuestFault) {
        let bot = self.bots[index].id();
        self.alive[index] = false;
        self.faults.push(FaultRecord {
            bot,
            phase,
            tick: self.tick,
            message: fault.to_string(),
        });
        self.event_bus.emit(MatchEvent::Fault { bot, phase, fault });
    }

    /// End the match if at most one bot is left.
    fn settle(&mut self, reason: EndReason) {
        let mut survivors = self.active_indices().into_iter();
        match (survivors.next(), survivors.next()) {
            (None, _) => self.finish(None, reason),
            (Some(only), None) => {
                let winner = self.bots[only].id();
                self.finish(Some(winner), reason);
            }
            (Some(_), Some(_)) => {}
        }
    }

    fn finish(&mut self, winner: Option<BotId>, reason: EndReason) {
        let result = MatchResult {
            winner,
            reason,
            final_tick: self.tick,
            faults: self.faults.clone(),
        };
        tracing::info!(
            winner = ?winner,
            reason = ?reason,
            tick = self.tick,
            faults = self.faults.len(),
            "match finished"
        );
        if let Some(replay) = &mut self.replay {
            replay.result = Some(result.clone());
        }
        self.result = Some(result);
        self.phase = MatchPhase::Terminal;
    }

    /// Drain this tick's events into the replay. Returns how many there were.
    fn flush_frame(&mut self) -> usize {
        let events = self.event_bus.drain_all();
        let count = events.len();
        if let Some(replay) = &mut self.replay {
            replay.push_frame(Frame {
                tick: self.tick,
                pucks: self.pucks.clone(),
                events,
            });
        }
        count
    }

    fn active_indices(&self) -> Vec<usize> {
        (0..self.bots.len()).filter(|&i| self.alive[i]).collect()
    }

    fn index_of(&self, bot: BotId) -> Option<usize> {
        self.bots.iter().position(|b| b.id() == bot)
    }

    /// Closest other active puck. Ties go to the earlier bot.
    fn nearest_enemy(&self, index: usize, active: &[usize]) -> usize {
        let own = self.pucks[index].position;
        let mut best: Option<(usize, f32)> = None;
        for &j in active {
            if j == index {
                continue;
            }
            let d = own.distance_squared(self.pucks[j].position);
            match best {
                Some((_, best_d)) if best_d <= d => {}
                _ => best = Some((j, d)),
            }
        }
        best.map_or(index, |(j, _)| j)
    }
}
