//! Table effects resolved against scene handles

use smallvec::SmallVec;

use scrollstage_shared::Effect;

use super::TickContext;
use crate::scene::{ClipId, Lookup, NodeId, ResolveError};

type Clips = SmallVec<[ClipId; 2]>;

/// [`Effect`] with its names replaced by handles
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompiledEffect {
    Visible { node: NodeId, visible: bool },
    Play { clips: Clips, start_time: f32 },
    Reverse { clips: Clips },
    Stop { clips: Clips },
    Pause { clips: Clips },
    ElementOpacity { element: String, opacity: f32 },
    Tint { node: NodeId, color: [f32; 4] },
}

impl CompiledEffect {
    pub(crate) fn compile(effect: &Effect, lookup: &Lookup<'_>) -> Result<Self, ResolveError> {
        Ok(match effect {
            Effect::Show { node } => CompiledEffect::Visible {
                node: lookup.node(node)?.id,
                visible: true,
            },
            Effect::Hide { node } => CompiledEffect::Visible {
                node: lookup.node(node)?.id,
                visible: false,
            },
            Effect::Play { clips, start_time } => CompiledEffect::Play {
                clips: lookup.clips(clips)?,
                start_time: start_time.unwrap_or(0.0),
            },
            Effect::Reverse { clips } => CompiledEffect::Reverse {
                clips: lookup.clips(clips)?,
            },
            Effect::Stop { clips } => CompiledEffect::Stop {
                clips: lookup.clips(clips)?,
            },
            Effect::Pause { clips } => CompiledEffect::Pause {
                clips: lookup.clips(clips)?,
            },
            Effect::ElementOpacity { element, opacity } => CompiledEffect::ElementOpacity {
                element: element.clone(),
                opacity: *opacity,
            },
            Effect::Tint { node, color } => CompiledEffect::Tint {
                node: lookup.node(node)?.id,
                color: *color,
            },
        })
    }

    pub(crate) fn compile_all(
        effects: &[Effect],
        lookup: &Lookup<'_>,
    ) -> Result<Vec<Self>, ResolveError> {
        effects.iter().map(|e| Self::compile(e, lookup)).collect()
    }

    pub(crate) fn apply(&self, ctx: &mut TickContext<'_>) {
        match self {
            CompiledEffect::Visible { node, visible } => ctx.scene.set_visible(*node, *visible),
            CompiledEffect::Play { clips, start_time } => {
                for &clip in clips {
                    if let Some(action) = ctx.scene.clip_mut(clip) {
                        action.play_forward_from(*start_time);
                    }
                }
            }
            CompiledEffect::Reverse { clips } => {
                for &clip in clips {
                    if let Some(action) = ctx.scene.clip_mut(clip) {
                        action.play_reverse();
                    }
                }
            }
            CompiledEffect::Stop { clips } => {
                for &clip in clips {
                    if let Some(action) = ctx.scene.clip_mut(clip) {
                        action.stop();
                    }
                }
            }
            CompiledEffect::Pause { clips } => {
                for &clip in clips {
                    if let Some(action) = ctx.scene.clip_mut(clip) {
                        action.pause();
                    }
                }
            }
            CompiledEffect::ElementOpacity { element, opacity } => {
                ctx.overlay.set_element_opacity(element, *opacity);
            }
            CompiledEffect::Tint { node, color } => ctx.scene.set_tint(*node, *color),
        }
    }
}
