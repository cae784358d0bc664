//! Discrete lanes.
//!
//! Lanes are indexed around the centre lane: with three lanes the valid
//! indices are `-1, 0, 1`.

/// Decoded lateral input intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    #[inline]
    fn step(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Lane index, always within `[-half_span, half_span]` of the track it was built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lane(i8);

impl Lane {
    pub const CENTRE: Self = Self(0);

    #[inline]
    pub fn new_clamped(index: i8, half_span: i8) -> Self {
        Self(index.clamp(-half_span, half_span))
    }

    #[inline]
    pub fn index(self) -> i8 {
        self.0
    }

    /// Neighbouring lane in `direction`, clamped to the track edge.
    #[inline]
    pub fn shifted(self, direction: LaneDirection, half_span: i8) -> Self {
        Self::new_clamped(self.0.saturating_add(direction.step()), half_span)
    }

    /// Lateral world coordinate of the lane centre.
    #[inline]
    pub fn center_x(self, lane_width: f32) -> f32 {
        f32::from(self.0) * lane_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, LaneDirection::Left, -1)]
    #[case(0, LaneDirection::Right, 1)]
    #[case(-1, LaneDirection::Left, -1)]
    #[case(1, LaneDirection::Right, 1)]
    #[case(1, LaneDirection::Left, 0)]
    fn shifting_clamps_to_track_edges(
        #[case] start: i8,
        #[case] direction: LaneDirection,
        #[case] expected: i8,
    ) {
        let lane = Lane::new_clamped(start, 1).shifted(direction, 1);
        assert_eq!(lane.index(), expected);
    }

    #[test]
    fn construction_clamps_out_of_range_indices() {
        assert_eq!(Lane::new_clamped(5, 2).index(), 2);
        assert_eq!(Lane::new_clamped(i8::MIN, 1).index(), -1);
    }

    #[test]
    fn center_x_scales_with_lane_width() {
        assert_eq!(Lane::new_clamped(-1, 1).center_x(2.5), -2.5);
        assert_eq!(Lane::CENTRE.center_x(2.5), 0.0);
    }
}
