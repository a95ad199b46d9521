//! Threshold animator

use scrollstage_shared::ThresholdFeature;

use super::effects::CompiledEffect;
use super::latch::{Crossing, ThresholdBank};
use super::{Animator, Resolution, TickContext};
use crate::scene::NodeId;

#[derive(Debug)]
struct Resolved {
    on_enter: Vec<Vec<CompiledEffect>>,
    on_exit: Vec<Vec<CompiledEffect>>,
    parent: Option<NodeId>,
}

/// Fires table effects when the scroll crosses each latch
///
/// The optional parent container is visible while any latch is active. It is
/// written only when a latch changes, never on an idle tick.
pub struct ThresholdAnimator {
    id: String,
    asset: Option<String>,
    feature: ThresholdFeature,
    bank: ThresholdBank,
    resolved: Resolution<Resolved>,
}

impl ThresholdAnimator {
    pub fn new(id: String, asset: Option<String>, feature: ThresholdFeature) -> Self {
        let bank = ThresholdBank::new(feature.entries.iter().map(|e| e.threshold));
        Self {
            id,
            asset,
            feature,
            bank,
            resolved: Resolution::Pending,
        }
    }

    pub fn bank(&self) -> &ThresholdBank {
        &self.bank
    }

    pub fn is_inert(&self) -> bool {
        self.resolved.is_inert()
    }
}

impl Animator for ThresholdAnimator {
    fn id(&self) -> &str {
        &self.id
    }

    fn tick(&mut self, scroll: f64, ctx: &mut TickContext<'_>) {
        let feature = &self.feature;
        self.resolved
            .resolve(&self.id, self.asset.as_deref(), ctx, |lookup| {
                let mut on_enter = Vec::with_capacity(feature.entries.len());
                let mut on_exit = Vec::with_capacity(feature.entries.len());
                for entry in &feature.entries {
                    on_enter.push(CompiledEffect::compile_all(&entry.on_enter, lookup)?);
                    on_exit.push(CompiledEffect::compile_all(&entry.on_exit, lookup)?);
                }
                let parent = match &feature.parent {
                    Some(name) => Some(lookup.node(name)?.id),
                    None => None,
                };
                Ok(Resolved {
                    on_enter,
                    on_exit,
                    parent,
                })
            });

        let Some(resolved) = self.resolved.ready() else {
            return;
        };

        let crossings = self.bank.update(scroll);
        if crossings.is_empty() {
            return;
        }

        for crossing in crossings {
            let (effects, entered, index) = match crossing {
                Crossing::Entered(i) => (&resolved.on_enter[i], true, i),
                Crossing::Exited(i) => (&resolved.on_exit[i], false, i),
            };
            tracing::debug!(feature = %self.id, index, entered, scroll, "threshold crossed");
            for effect in effects {
                effect.apply(ctx);
            }
        }

        if let Some(parent) = resolved.parent {
            ctx.scene.set_visible(parent, self.bank.any_active());
        }
    }
}
