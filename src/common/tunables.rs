//! Tunable gameplay constants.
//!
//! Loaded once at start-up. Every field has a default so a TOML override file
//! only needs to list the values it changes.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::error::ConfigError;

/// Upper bound on any pool or segment count; render handles index with `u16`.
pub const MAX_POOL_SIZE: usize = u16::MAX as usize + 1;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tunables {
    // Lanes
    pub lane_count: u8,
    pub lane_width: f32,

    // Pools
    pub enemy_pool_size: usize,
    pub projectile_pool_size: usize,

    // Speeds
    pub move_speed: f32,
    pub speed_ramp: f32,
    pub projectile_speed: f32,
    pub lane_switch_smoothing: f32,

    // Health / damage
    pub player_max_health: i32,
    pub enemy_max_health: i32,
    pub enemy_contact_damage: i32,
    pub projectile_damage: i32,

    // Timing
    pub projectile_cooldown: f32,
    pub spawn_interval_min: f32,
    pub spawn_interval_max: f32,
    pub hit_flash_duration: f32,
    pub death_shrink_duration: f32,

    // Score
    pub enemy_score_value: i32,
    pub reach_penalty: i32,

    // Geometry (world units)
    pub player_start_z: f32,
    pub player_height: f32,
    pub enemy_base_y: f32,
    pub enemy_half_extent: f32,
    pub projectile_half_extent: f32,
    pub ground_segment_length: f32,
    pub ground_segments: u32,
    pub camera_z: f32,
    pub view_margin: f32,
    pub reach_margin: f32,

    // Presentation
    pub health_bar_width: f32,
    pub health_bar_height: f32,
    pub pixels_per_meter: f32,

    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            lane_count: 3,
            lane_width: 2.0,
            enemy_pool_size: 20,
            projectile_pool_size: 30,
            move_speed: 10.0,
            speed_ramp: 0.5,
            projectile_speed: 30.0,
            lane_switch_smoothing: 0.15,
            player_max_health: 100,
            enemy_max_health: 30,
            enemy_contact_damage: 20,
            projectile_damage: 10,
            projectile_cooldown: 0.25,
            spawn_interval_min: 0.8,
            spawn_interval_max: 2.0,
            hit_flash_duration: 0.1,
            death_shrink_duration: 0.3,
            enemy_score_value: 10,
            reach_penalty: 5,
            player_start_z: 0.0,
            player_height: 0.7,
            enemy_base_y: 0.5,
            enemy_half_extent: 0.5,
            projectile_half_extent: 0.15,
            ground_segment_length: 20.0,
            ground_segments: 5,
            camera_z: 6.0,
            view_margin: 10.0,
            reach_margin: 0.5,
            health_bar_width: 1.0,
            health_bar_height: 0.15,
            pixels_per_meter: 8.0,
            seed: None,
        }
    }
}

impl Tunables {
    /// Parse an override file body and validate the result.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let tunables: Self = toml::from_str(src)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Every float tunable, by field name.
    fn float_fields(&self) -> [(&'static str, f32); 27] {
        [
            ("lane_width", self.lane_width),
            ("move_speed", self.move_speed),
            ("speed_ramp", self.speed_ramp),
            ("projectile_speed", self.projectile_speed),
            ("lane_switch_smoothing", self.lane_switch_smoothing),
            ("projectile_cooldown", self.projectile_cooldown),
            ("spawn_interval_min", self.spawn_interval_min),
            ("spawn_interval_max", self.spawn_interval_max),
            ("hit_flash_duration", self.hit_flash_duration),
            ("death_shrink_duration", self.death_shrink_duration),
            ("player_start_z", self.player_start_z),
            ("player_height", self.player_height),
            ("enemy_base_y", self.enemy_base_y),
            ("enemy_half_extent", self.enemy_half_extent),
            ("projectile_half_extent", self.projectile_half_extent),
            ("ground_segment_length", self.ground_segment_length),
            ("camera_z", self.camera_z),
            ("view_margin", self.view_margin),
            ("reach_margin", self.reach_margin),
            ("health_bar_width", self.health_bar_width),
            ("health_bar_height", self.health_bar_height),
            ("pixels_per_meter", self.pixels_per_meter),
            // Derived depths must stay finite too.
            ("ground_segment_length", self.far_z()),
            ("ground_segment_length", self.enemy_spawn_z()),
            ("camera_z", self.behind_camera_z()),
            ("move_speed", self.ramped_speed(60.0)),
            ("spawn_interval_max", self.spawn_interval_max - self.spawn_interval_min),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if let Some((field, _)) = self.float_fields().into_iter().find(|(_, v)| !v.is_finite()) {
            return invalid(field, "must be a finite number");
        }

        if self.lane_count == 0 || self.lane_count % 2 == 0 {
            return invalid("lane_count", "must be odd so a centre lane exists");
        }
        if self.lane_width <= 0.0 {
            return invalid("lane_width", "must be positive");
        }
        if self.enemy_pool_size == 0 {
            return invalid("enemy_pool_size", "must be at least 1");
        }
        if self.enemy_pool_size > MAX_POOL_SIZE {
            return invalid("enemy_pool_size", "exceeds the render handle range");
        }
        if self.projectile_pool_size == 0 {
            return invalid("projectile_pool_size", "must be at least 1");
        }
        if self.projectile_pool_size > MAX_POOL_SIZE {
            return invalid("projectile_pool_size", "exceeds the render handle range");
        }
        if self.spawn_interval_min <= 0.0 {
            return invalid("spawn_interval_min", "must be positive");
        }
        if self.spawn_interval_min > self.spawn_interval_max {
            return invalid("spawn_interval_max", "must not be below spawn_interval_min");
        }
        if !(0.0..=1.0).contains(&self.lane_switch_smoothing) {
            return invalid("lane_switch_smoothing", "must lie in [0, 1]");
        }
        if self.death_shrink_duration <= 0.0 {
            return invalid("death_shrink_duration", "must be positive");
        }
        if self.player_max_health <= 0 {
            return invalid("player_max_health", "must be positive");
        }
        if self.enemy_max_health <= 0 {
            return invalid("enemy_max_health", "must be positive");
        }
        if self.ground_segment_length <= 0.0 {
            return invalid("ground_segment_length", "must be positive");
        }
        if self.ground_segments == 0 {
            return invalid("ground_segments", "must be at least 1");
        }
        if self.ground_segments as usize > MAX_POOL_SIZE {
            return invalid("ground_segments", "exceeds the render handle range");
        }
        Ok(())
    }

    /// Outermost lane index on either side of the centre lane.
    #[inline]
    pub fn lane_half_span(&self) -> i8 {
        (self.lane_count / 2) as i8
    }

    /// Depth at which enemies enter the track.
    #[inline]
    pub fn enemy_spawn_z(&self) -> f32 {
        -self.ground_segment_length * (self.ground_segments as f32 - 1.5)
    }

    /// Far end of the track; projectiles past this are out of play.
    #[inline]
    pub fn far_z(&self) -> f32 {
        -self.ground_segment_length * self.ground_segments as f32
    }

    /// Anything past this is behind the camera.
    #[inline]
    pub fn behind_camera_z(&self) -> f32 {
        self.camera_z + self.view_margin
    }

    /// Forward speed after `run_time` seconds.
    ///
    /// Enemies and the scrolling track both use this, so what the player sees
    /// matches what the simulation does.
    #[inline]
    pub fn ramped_speed(&self, run_time: f32) -> f32 {
        self.move_speed * (1.0 + run_time / 60.0 * self.speed_ramp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        assert!(Tunables::default().validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_listed_fields() {
        let t = Tunables::from_toml_str("enemy_pool_size = 4\nseed = 7\n").unwrap();
        assert_eq!(t.enemy_pool_size, 4);
        assert_eq!(t.seed, Some(7));
        assert_eq!(t.projectile_pool_size, Tunables::default().projectile_pool_size);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = Tunables::from_toml_str("warp_drive = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_spawn_interval_is_rejected() {
        let err = Tunables::from_toml_str("spawn_interval_min = 3.0\nspawn_interval_max = 1.0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "spawn_interval_max", .. }));
    }

    #[test]
    fn even_lane_count_is_rejected() {
        let t = Tunables { lane_count: 4, ..default() };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::Invalid { field: "lane_count", .. })
        ));
    }

    #[rstest]
    #[case("ground_segment_length = 0.0", "ground_segment_length")]
    #[case("ground_segment_length = -20.0", "ground_segment_length")]
    #[case("lane_width = 0.0", "lane_width")]
    #[case("spawn_interval_min = nan", "spawn_interval_min")]
    #[case("spawn_interval_max = inf", "spawn_interval_max")]
    #[case("death_shrink_duration = nan", "death_shrink_duration")]
    #[case("move_speed = -inf", "move_speed")]
    #[case("camera_z = nan", "camera_z")]
    #[case("enemy_pool_size = 70000", "enemy_pool_size")]
    #[case("projectile_pool_size = 65537", "projectile_pool_size")]
    #[case("ground_segments = 100000", "ground_segments")]
    fn degenerate_values_are_rejected_at_load(#[case] src: &str, #[case] expected: &str) {
        match Tunables::from_toml_str(src) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid `{expected}`, got {other:?}"),
        }
    }

    #[test]
    fn largest_addressable_pool_is_accepted() {
        let t = Tunables {
            enemy_pool_size: MAX_POOL_SIZE,
            ..default()
        };
        assert!(t.validate().is_ok());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Tunables::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn speed_ramp_is_linear_in_run_time() {
        let t = Tunables::default();
        assert_eq!(t.ramped_speed(0.0), t.move_speed);
        let one_minute = t.ramped_speed(60.0);
        assert!((one_minute - t.move_speed * (1.0 + t.speed_ramp)).abs() < 1e-5);
    }

    #[test]
    fn spawn_depth_follows_track_length() {
        let t = Tunables::default();
        assert_eq!(t.enemy_spawn_z(), -70.0);
        assert_eq!(t.far_z(), -100.0);
    }
}
