use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::boundary::{exit_fraction, resolve_boundary, BoundaryOutcome};
use crate::collision::{bounce, ram_verdict, time_of_impact, RamVerdict};
use crate::config::{ArenaConfig, CollisionPolicy, PhysicsRules};
use crate::integrate::integrate;
use crate::state::{BotId, PuckState};

/// A pair of pucks that touched during the tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub first: BotId,
    pub second: BotId,
    pub verdict: RamVerdict,
    /// True if the contact was resolved by bouncing instead of ending play.
    pub bounced: bool,
}

/// Everything one physics tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub pucks: Vec<PuckState>,
    pub boundary: Vec<(BotId, BoundaryOutcome)>,
    pub contacts: Vec<Contact>,
}

impl StepReport {
    pub fn exited(&self) -> impl Iterator<Item = BotId> + '_ {
        self.boundary
            .iter()
            .filter(|(_, outcome)| *outcome == BoundaryOutcome::Exited)
            .map(|(id, _)| *id)
    }
}

/// Advance every puck by one tick.
///
/// `actions[i]` drives `pucks[i]`. Order of the slice is the fixed match
/// order and is preserved in the report.
///
/// The wall is resolved before contacts, and each contact is judged at the
/// moment the pucks first touch rather than at the end of the tick.
pub fn step(
    pucks: &[PuckState],
    actions: &[Action],
    config: &ArenaConfig,
    rules: &PhysicsRules,
) -> StepReport {
    debug_assert_eq!(pucks.len(), actions.len());

    let integrated: Vec<PuckState> = pucks
        .iter()
        .zip(actions)
        .map(|(puck, action)| integrate(puck, *action, config, rules))
        .collect();

    let mut next = integrated.clone();
    let mut outcomes: Vec<BoundaryOutcome> = next
        .iter_mut()
        .map(|puck| resolve_boundary(puck, config, rules.boundary))
        .collect();

    // A puck that left the arena can only be touched before it crossed the wall.
    let in_play: Vec<f32> = pucks
        .iter()
        .zip(&integrated)
        .zip(&outcomes)
        .map(|((prev, moved), outcome)| match outcome {
            BoundaryOutcome::Exited => exit_fraction(prev.position, moved.position, config),
            _ => 1.0,
        })
        .collect();

    let mut contacts = Vec::new();
    for i in 0..next.len() {
        for j in (i + 1)..next.len() {
            let Some(t) = time_of_impact(&pucks[i], &next[i], &pucks[j], &next[j], config.contact_distance())
            else {
                continue;
            };
            if t > in_play[i].min(in_play[j]) {
                continue;
            }

            let a = state_at(&pucks[i], &next[i], t);
            let b = state_at(&pucks[j], &next[j], t);
            let verdict = ram_verdict(&a, &b);
            let bounced = rules.collision == CollisionPolicy::Bounce;
            if bounced {
                let (va, vb) = bounce(&a, &b);
                if (va, vb) != (a.velocity, b.velocity) {
                    let remaining = (1.0 - t) * rules.dt;
                    for (k, contact, velocity) in [(i, a, va), (j, b, vb)] {
                        next[k].position = contact.position + velocity * remaining;
                        next[k].velocity = velocity;
                        let again = resolve_boundary(&mut next[k], config, rules.boundary);
                        if again != BoundaryOutcome::Inside || outcomes[k] == BoundaryOutcome::Exited {
                            outcomes[k] = again;
                        }
                    }
                }
            }
            contacts.push(Contact {
                first: next[i].id,
                second: next[j].id,
                verdict,
                bounced,
            });
        }
    }

    let boundary = next
        .iter()
        .zip(outcomes)
        .filter(|(_, outcome)| *outcome != BoundaryOutcome::Inside)
        .map(|(puck, outcome)| (puck.id, outcome))
        .collect();

    if !contacts.is_empty() {
        tracing::trace!(contacts = contacts.len(), "puck contacts this tick");
    }

    StepReport {
        pucks: next,
        boundary,
        contacts,
    }
}

/// `prev` moved a fraction `t` of the way to `next`, carrying `next`'s velocity.
fn state_at(prev: &PuckState, next: &PuckState, t: f32) -> PuckState {
    PuckState {
        position: prev.position.lerp(next.position, t),
        ..*next
    }
}
