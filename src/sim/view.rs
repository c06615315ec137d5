//! Render contract
//!
//! A flat snapshot of everything the renderer draws for one frame. Built after
//! `tick`, so it never contains destroyed entities.

use glam::Vec2;

use super::effects::{Particle, Tone};
use super::lane::{BandMember, LaneRect};
use super::note::{Note, NoteKind};
use super::state::{GameState, Outcome};
use crate::arcade::ObjectKind;

/// Frames each switch-note animation cell is shown
const SWITCH_ANIM_FRAMES: u64 = 8;
const SWITCH_ANIM_CELLS: u64 = 4;

/// RGBA for a particle tone, faded by remaining life
fn tone_color(tone: Tone, life: f32) -> [f32; 4] {
    let alpha = life.clamp(0.0, 1.0);
    match tone {
        Tone::OnBeat => [1.0, 0.85, 0.2, alpha],
        Tone::OffBeat => [0.3, 0.8, 1.0, alpha],
        Tone::Penalty => [1.0, 0.25, 0.25, alpha],
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneView {
    pub index: usize,
    pub rect: LaneRect,
    pub hit_bar_y: f32,
    /// Competency as 0-1
    pub competency: f32,
    pub active: bool,
    /// Receives trigger input this frame
    pub judged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteSprite {
    pub id: u32,
    pub lane: usize,
    pub kind: NoteKind,
    pub pos: Vec2,
    /// Tail end for holds, equal to `pos.y` otherwise
    pub tail_y: f32,
    pub visible: bool,
    /// Sprite sheet cell
    pub frame: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub pos: Vec2,
    pub size: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSprite {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// Everything drawn for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameView {
    pub lanes: Vec<LaneView>,
    pub notes: Vec<NoteSprite>,
    pub particles: Vec<ParticleSprite>,
    pub objects: Vec<ObjectSprite>,
    /// Transition completion, 0 outside a switch
    pub transition: f32,
    pub score: i64,
    pub combo: u32,
    pub outcome: Outcome,
}

impl FrameView {
    pub fn capture(state: &GameState) -> Self {
        let mut view = Self {
            transition: state.phase.fraction(),
            score: state.score(),
            combo: state.scoreboard.combo,
            outcome: state.outcome,
            ..Default::default()
        };

        let active = state.phase.active();
        let judged = state.phase.judged_lane();
        for lane in &state.lanes {
            view.lanes.push(LaneView {
                index: lane.index,
                rect: lane.rect,
                hit_bar_y: lane.hit_bar_y(),
                competency: lane.competency_fraction(),
                active: lane.index == active,
                judged: lane.index == judged,
            });
            let notes = lane.hit_notes.iter().chain(lane.switch_notes.iter());
            for note in notes.filter(|n| !n.destroyed) {
                view.notes.push(note_sprite(lane, note, state.frame));
            }
        }

        view.particles.extend(
            state
                .effects
                .particles
                .iter()
                .filter(|p| !p.destroyed)
                .map(particle_sprite),
        );

        if let Some(arcade) = &state.arcade {
            view.objects.extend(arcade.objects.iter().filter(|o| !o.destroyed).map(|o| {
                ObjectSprite {
                    id: o.id,
                    kind: o.kind,
                    pos: o.pos,
                    radius: o.radius,
                }
            }));
        }
        view
    }

    pub fn visible_notes(&self) -> impl Iterator<Item = &NoteSprite> {
        self.notes.iter().filter(|n| n.visible)
    }
}

fn note_sprite(lane: &BandMember, note: &Note, frame: u64) -> NoteSprite {
    // Visible while any part of the note overlaps the lane
    let (low, high) = (note.pos.y.min(note.tail_y), note.pos.y.max(note.tail_y));
    let visible = high >= lane.rect.y && low <= lane.rect.top();
    let frame = match note.kind {
        NoteKind::Single => 0,
        NoteKind::Hold { .. } => note.holding as u32,
        NoteKind::Switch => ((frame / SWITCH_ANIM_FRAMES) % SWITCH_ANIM_CELLS) as u32,
    };
    NoteSprite {
        id: note.id,
        lane: lane.index,
        kind: note.kind,
        pos: note.pos,
        tail_y: note.tail_y,
        visible,
        frame,
    }
}

fn particle_sprite(particle: &Particle) -> ParticleSprite {
    ParticleSprite {
        pos: particle.pos,
        size: particle.size,
        color: tone_color(particle.tone, particle.life),
    }
}
