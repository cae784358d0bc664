//! Scene sink: the boundary between the simulation and whatever draws it.
//!
//! The simulation never touches sprites, cameras or lights. It hands the sink
//! stable [`RenderHandle`]s and value mutations (position, visibility, scale,
//! tint, health bar) and the renderer decides what they look like.

use bevy::prelude::*;

use crate::common::tunables::MAX_POOL_SIZE;

/// What a renderable represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderKind {
    Player,
    Enemy,
    Projectile,
    Ground,
}

/// Stable id for one renderable. Pool slots keep the same handle for life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle {
    pub kind: RenderKind,
    pub index: u16,
}

/// Pool slot -> handle index. `Tunables::validate` caps every pool at
/// `MAX_POOL_SIZE`, so the conversion is lossless for validated configs.
#[inline]
fn slot_index(index: usize) -> u16 {
    debug_assert!(index < MAX_POOL_SIZE, "render handle index {index} out of range");
    index as u16
}

impl RenderHandle {
    pub const PLAYER: Self = Self::new(RenderKind::Player, 0);

    #[inline]
    pub const fn new(kind: RenderKind, index: u16) -> Self {
        Self { kind, index }
    }

    #[inline]
    pub fn enemy(index: usize) -> Self {
        Self::new(RenderKind::Enemy, slot_index(index))
    }

    #[inline]
    pub fn projectile(index: usize) -> Self {
        Self::new(RenderKind::Projectile, slot_index(index))
    }

    #[inline]
    pub fn ground(index: usize) -> Self {
        Self::new(RenderKind::Ground, slot_index(index))
    }
}

/// Colour intent; the renderer maps it to a palette per [`RenderKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tint {
    #[default]
    Base,
    /// Full-bright hit flash.
    Flash,
}

pub trait SceneSink {
    fn add_entity(&mut self, handle: RenderHandle);
    fn remove_entity(&mut self, handle: RenderHandle);
    fn set_transform(&mut self, handle: RenderHandle, position: Vec3, scale: f32);
    fn set_visible(&mut self, handle: RenderHandle, visible: bool);
    fn set_tint(&mut self, handle: RenderHandle, tint: Tint);
    /// `fraction` is clamped to `[0, 1]` by the caller.
    fn set_health_bar(&mut self, handle: RenderHandle, fraction: f32, visible: bool);
    fn render(&mut self);
    fn on_viewport_resize(&mut self, width: f32, height: f32);
}

/// Shared shape of everything the game loop drives.
///
/// Update signatures differ per participant (the enemy pass needs run time,
/// the projectile pass needs the enemies), so only the scene plumbing and
/// reset live here.
pub trait Simulated {
    /// Announce every renderable this participant owns. Called once.
    fn register(&mut self, scene: &mut dyn SceneSink);

    /// Push this tick's visible state to the scene.
    fn sync(&mut self, scene: &mut dyn SceneSink);

    /// Back to the initial inert state. Idempotent.
    fn reset(&mut self);
}

/// One recorded scene mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneCommand {
    Add(RenderHandle),
    Remove(RenderHandle),
    Transform {
        handle: RenderHandle,
        position: Vec3,
        scale: f32,
    },
    Visible {
        handle: RenderHandle,
        visible: bool,
    },
    Tint {
        handle: RenderHandle,
        tint: Tint,
    },
    HealthBar {
        handle: RenderHandle,
        fraction: f32,
        visible: bool,
    },
}

/// Recording scene sink.
///
/// The tick writes here; the render plugin drains it in `PostUpdate` and a
/// `Last` system clears whatever is left (headless apps have no renderer).
#[derive(Resource, Debug, Default)]
pub struct SceneCommands {
    pub commands: Vec<SceneCommand>,
    pub frames_rendered: u64,
    pub viewport: Option<Vec2>,
}

impl SceneCommands {
    /// Last visibility recorded for `handle` in the pending buffer.
    pub fn last_visibility(&self, handle: RenderHandle) -> Option<bool> {
        self.commands.iter().rev().find_map(|c| match c {
            SceneCommand::Visible { handle: h, visible } if *h == handle => Some(*visible),
            _ => None,
        })
    }

    pub fn last_transform(&self, handle: RenderHandle) -> Option<(Vec3, f32)> {
        self.commands.iter().rev().find_map(|c| match c {
            SceneCommand::Transform {
                handle: h,
                position,
                scale,
            } if *h == handle => Some((*position, *scale)),
            _ => None,
        })
    }
}

impl SceneSink for SceneCommands {
    fn add_entity(&mut self, handle: RenderHandle) {
        self.commands.push(SceneCommand::Add(handle));
    }

    fn remove_entity(&mut self, handle: RenderHandle) {
        self.commands.push(SceneCommand::Remove(handle));
    }

    fn set_transform(&mut self, handle: RenderHandle, position: Vec3, scale: f32) {
        self.commands.push(SceneCommand::Transform {
            handle,
            position,
            scale,
        });
    }

    fn set_visible(&mut self, handle: RenderHandle, visible: bool) {
        self.commands.push(SceneCommand::Visible { handle, visible });
    }

    fn set_tint(&mut self, handle: RenderHandle, tint: Tint) {
        self.commands.push(SceneCommand::Tint { handle, tint });
    }

    fn set_health_bar(&mut self, handle: RenderHandle, fraction: f32, visible: bool) {
        self.commands.push(SceneCommand::HealthBar {
            handle,
            fraction,
            visible,
        });
    }

    fn render(&mut self) {
        self.frames_rendered += 1;
    }

    fn on_viewport_resize(&mut self, width: f32, height: f32) {
        self.viewport = Some(Vec2::new(width, height));
    }
}
