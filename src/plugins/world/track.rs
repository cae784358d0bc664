//! Scrolling ground track.
//!
//! The track is a ring of equal segments laid end to end along -Z. Each tick
//! every segment moves toward the camera; a segment that passes
//! `1.5 * segment_length` jumps back by the full ring length, at most once per
//! tick.

use bevy::prelude::*;

use crate::common::tunables::Tunables;

use super::scene::{RenderHandle, SceneSink, Simulated};

#[derive(Resource, Debug, Clone)]
pub struct Track {
    segment_length: f32,
    segments: Vec<f32>,
    distance: f32,
}

impl Track {
    pub fn new(tunables: &Tunables) -> Self {
        let segment_length = tunables.ground_segment_length;
        let count = tunables.ground_segments as usize;
        Self {
            segment_length,
            segments: (0..count).map(|i| Self::initial_z(i, segment_length)).collect(),
            distance: 0.0,
        }
    }

    #[inline]
    fn initial_z(index: usize, segment_length: f32) -> f32 {
        -(index as f32) * segment_length + segment_length * 0.5
    }

    /// Move the ring forward by `speed * dt`.
    pub fn advance(&mut self, dt: f32, speed: f32) {
        let step = speed * dt;
        let ring = self.segment_length * self.segments.len() as f32;
        let wrap_at = self.segment_length * 1.5;

        for z in &mut self.segments {
            *z += step;
            if *z > wrap_at {
                *z -= ring;
            }
        }
        self.distance += step;
    }

    /// Total distance scrolled since the last reset.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[inline]
    pub fn segment_z(&self, index: usize) -> Option<f32> {
        self.segments.get(index).copied()
    }
}

impl Simulated for Track {
    fn register(&mut self, scene: &mut dyn SceneSink) {
        for i in 0..self.segments.len() {
            let handle = RenderHandle::ground(i);
            scene.add_entity(handle);
            scene.set_visible(handle, true);
        }
    }

    fn sync(&mut self, scene: &mut dyn SceneSink) {
        for (i, z) in self.segments.iter().enumerate() {
            scene.set_transform(RenderHandle::ground(i), Vec3::new(0.0, 0.0, *z), 1.0);
        }
    }

    fn reset(&mut self) {
        let len = self.segment_length;
        for (i, z) in self.segments.iter_mut().enumerate() {
            *z = Self::initial_z(i, len);
        }
        self.distance = 0.0;
    }
}
