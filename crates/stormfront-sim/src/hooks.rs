//! Event delivery and policy hooks.
//!
//! Listeners receive immutable events synchronously, in registration order.
//! Anything that used to mutate an event in flight is a policy hook that
//! returns a decision value instead.

use stormfront_core::enums::{StormClass, SubjectKind};
use stormfront_core::events::StormEvent;
use stormfront_core::types::{Position, StormId, SubjectId};

pub type Listener = Box<dyn FnMut(&StormEvent) + Send>;

/// Ordered list of event listeners. Publishing with none is a no-op.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn publish(&mut self, event: &StormEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// What a damage policy sees before damage is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageContext {
    pub subject: SubjectId,
    pub kind: SubjectKind,
    pub storm: StormId,
    pub class: StormClass,
    pub position: Position,
}

/// Exposure verdict and damage amount. Clearing `exposed` cancels damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageDecision {
    pub exposed: bool,
    pub amount: f64,
}

/// Inspect or override damage before it is applied. Policies run in
/// registration order, each receiving the previous decision.
pub trait DamagePolicy: Send {
    fn decide(&mut self, ctx: &DamageContext, current: DamageDecision) -> DamageDecision;
}

impl<F> DamagePolicy for F
where
    F: FnMut(&DamageContext, DamageDecision) -> DamageDecision + Send,
{
    fn decide(&mut self, ctx: &DamageContext, current: DamageDecision) -> DamageDecision {
        self(ctx, current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreStormDecision {
    Proceed,
    Cancel,
}

/// Consulted before a scheduled countdown begins.
pub trait PreStormPolicy: Send {
    fn decide(&mut self, class: StormClass) -> PreStormDecision;
}

impl<F> PreStormPolicy for F
where
    F: FnMut(StormClass) -> PreStormDecision + Send,
{
    fn decide(&mut self, class: StormClass) -> PreStormDecision {
        self(class)
    }
}

/// Run a damage policy chain.
pub fn apply_damage_policies(
    policies: &mut [Box<dyn DamagePolicy>],
    ctx: &DamageContext,
    initial: DamageDecision,
) -> DamageDecision {
    policies
        .iter_mut()
        .fold(initial, |decision, policy| policy.decide(ctx, decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn ctx() -> DamageContext {
        DamageContext {
            subject: SubjectId(1),
            kind: SubjectKind::Player,
            storm: StormId(1),
            class: StormClass::Moderate,
            position: Position::default(),
        }
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::default();
        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            bus.subscribe(Box::new(move |_event| log.lock().unwrap().push(tag)));
        }
        bus.publish(&StormEvent::AllClear {
            next_storm_in_secs: 10.0,
        });
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn empty_bus_is_noop() {
        let mut bus = EventBus::default();
        assert!(bus.is_empty());
        bus.publish(&StormEvent::StormEnded {
            storm: StormId(1),
            reason: stormfront_core::enums::EndReason::Expired,
        });
    }

    #[test]
    fn last_policy_wins_on_amount() {
        let mut policies: Vec<Box<dyn DamagePolicy>> = vec![
            Box::new(|_: &DamageContext, d: DamageDecision| DamageDecision {
                amount: d.amount * 10.0,
                ..d
            }),
            Box::new(|_: &DamageContext, d: DamageDecision| DamageDecision { amount: 3.0, ..d }),
        ];
        let decision = apply_damage_policies(
            &mut policies,
            &ctx(),
            DamageDecision {
                exposed: true,
                amount: 1.0,
            },
        );
        assert_eq!(decision.amount, 3.0);
        assert!(decision.exposed);
    }
}
