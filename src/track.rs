use crate::lane::{Lane, LineType};
use crate::math::Point2d;
use itertools::Itertools;
use rand::Rng;
use smallvec::SmallVec;
use std::fmt;

/// A node label in the track graph.
pub type Node = &'static str;

/// The segment the controlled vehicle starts on.
pub const START_SEGMENT: SegmentId = SegmentId::new("a", "b");

/// The segment the mandatory first bot is placed on.
pub const FEEDER_SEGMENT: SegmentId = SegmentId::new("b", "c");

/// Identifies a directed track segment between two named nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SegmentId {
    pub from: Node,
    pub to: Node,
}

impl SegmentId {
    pub const fn new(from: Node, to: Node) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Identifies one lane within a segment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LaneId {
    pub segment: SegmentId,
    pub index: usize,
}

impl LaneId {
    pub const fn new(from: Node, to: Node, index: usize) -> Self {
        Self {
            segment: SegmentId::new(from, to),
            index,
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.segment, self.index)
    }
}

/// The two supported track layouts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Topology {
    Small,
    Large,
}

/// A directed segment holding its parallel lanes.
struct Segment {
    id: SegmentId,
    lanes: SmallVec<[Lane; 2]>,
}

/// An immutable graph of track segments forming a single closed circuit.
pub struct RoadGraph {
    segments: Vec<Segment>,
}

impl RoadGraph {
    /// Builds the track for the given topology.
    ///
    /// Construction is pure and deterministic; the same topology always
    /// produces the same graph.
    pub fn build(topology: Topology) -> Self {
        let graph = match topology {
            Topology::Small => small_track(),
            Topology::Large => large_track(),
        };
        debug_assert!(graph.is_closed_cycle());
        graph
    }

    /// Gets the lane with the given ID.
    ///
    /// Panics if the lane does not exist; lane IDs are only produced by this
    /// graph, so a miss is a programming error.
    pub fn lane(&self, id: LaneId) -> &Lane {
        self.get_lane(id)
            .unwrap_or_else(|| panic!("no lane {id} in road graph"))
    }

    /// Gets the lane with the given ID, if it exists.
    pub fn get_lane(&self, id: LaneId) -> Option<&Lane> {
        self.segments
            .iter()
            .find(|segment| segment.id == id.segment)
            .and_then(|segment| segment.lanes.get(id.index))
    }

    /// Returns an iterator over the segments in traversal order.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &[Lane])> {
        self.segments
            .iter()
            .map(|segment| (segment.id, segment.lanes.as_slice()))
    }

    /// The number of segments in the circuit.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The number of parallel lanes in the given segment, or zero if the
    /// segment does not exist.
    pub fn lane_count(&self, id: SegmentId) -> usize {
        self.segments
            .iter()
            .find(|segment| segment.id == id)
            .map_or(0, |segment| segment.lanes.len())
    }

    /// Samples a uniformly random segment, then a uniformly random lane
    /// within it.
    pub fn random_lane(&self, rng: &mut impl Rng) -> LaneId {
        let segment = &self.segments[rng.gen_range(0..self.segments.len())];
        LaneId {
            segment: segment.id,
            index: rng.gen_range(0..segment.lanes.len()),
        }
    }

    /// Returns true if the segments form a single closed cycle: each
    /// segment's destination is its successor's origin, wrapping from the
    /// last segment back to the first, and no node is visited twice.
    pub fn is_closed_cycle(&self) -> bool {
        let connected = self
            .segments
            .iter()
            .circular_tuple_windows()
            .all(|(a, b)| a.id.to == b.id.from);
        let single_loop = self.segments.iter().map(|s| s.id.from).all_unique();
        connected && single_loop
    }

    fn add_lane(&mut self, from: Node, to: Node, lane: Lane) {
        let id = SegmentId::new(from, to);
        match self.segments.iter_mut().find(|segment| segment.id == id) {
            Some(segment) => segment.lanes.push(lane),
            None => self.segments.push(Segment {
                id,
                lanes: SmallVec::from_iter([lane]),
            }),
        }
    }
}

fn p(x: f64, y: f64) -> Point2d {
    Point2d::new(x, y)
}

fn rad(deg: f64) -> f64 {
    deg.to_radians()
}

use LineType::{Continuous, Striped};
const NO_LINE: LineType = LineType::None;

/// Lane width used by both circuits, in m.
const WIDTH: f64 = 5.0;

/// Speed limit on every section of both circuits, in m/s.
const SPEED_LIMIT: f64 = 10.0;

/// The nine-segment club circuit: a start/finish straight, a hairpin
/// complex and a long double-apex return curve.
fn small_track() -> RoadGraph {
    let mut net = RoadGraph { segments: vec![] };

    // 1 - Start/finish straight
    net.add_lane(
        "a",
        "b",
        Lane::straight(p(42.0, 0.0), p(100.0, 0.0), [Continuous, Striped], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "a",
        "b",
        Lane::straight(p(42.0, 5.0), p(100.0, 5.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 2 - Circular arc #1
    let center1 = p(100.0, -20.0);
    let radii1 = 20.0;
    net.add_lane(
        "b",
        "c",
        Lane::circular(center1, radii1, rad(90.0), rad(-1.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "b",
        "c",
        Lane::circular(center1, radii1 + 5.0, rad(90.0), rad(-1.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 3 - Vertical straight
    net.add_lane(
        "c",
        "d",
        Lane::straight(p(120.0, -20.0), p(120.0, -30.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "c",
        "d",
        Lane::straight(p(125.0, -20.0), p(125.0, -30.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 4 - Circular arc #2
    let center2 = p(105.0, -30.0);
    let radii2 = 15.0;
    net.add_lane(
        "d",
        "e",
        Lane::circular(center2, radii2, rad(0.0), rad(-181.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "d",
        "e",
        Lane::circular(center2, radii2 + 5.0, rad(0.0), rad(-181.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 5 - Circular arc #3
    let center3 = p(70.0, -30.0);
    let radii3 = 15.0;
    net.add_lane(
        "e",
        "f",
        Lane::circular(center3, radii3 + 5.0, rad(0.0), rad(136.0), true, [Continuous, Striped], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "e",
        "f",
        Lane::circular(center3, radii3, rad(0.0), rad(137.0), true, [NO_LINE, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 6 - Slant
    net.add_lane(
        "f",
        "g",
        Lane::straight(p(55.7, -15.7), p(35.7, -35.7), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "f",
        "g",
        Lane::straight(p(59.3934, -19.2), p(39.3934, -39.2), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 7 - Circular arc #4 - split in two sections to keep each sweep small
    let center4 = p(18.1, -18.1);
    let radii4 = 25.0;
    net.add_lane(
        "g",
        "h",
        Lane::circular(center4, radii4, rad(315.0), rad(170.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "g",
        "h",
        Lane::circular(center4, radii4 + 5.0, rad(315.0), rad(165.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "h",
        "i",
        Lane::circular(center4, radii4, rad(170.0), rad(56.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "h",
        "i",
        Lane::circular(center4, radii4 + 5.0, rad(170.0), rad(58.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 8 - Circular arc #5 - reconnects to the start
    let center5 = p(43.2, 23.4);
    let radii5 = 18.5;
    net.add_lane(
        "i",
        "a",
        Lane::circular(center5, radii5 + 5.0, rad(240.0), rad(270.0), true, [Continuous, Striped], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "i",
        "a",
        Lane::circular(center5, radii5, rad(238.0), rad(268.0), true, [NO_LINE, Continuous], WIDTH, SPEED_LIMIT),
    );

    net
}

/// The sixteen-segment grand circuit: roughly twice the lap length of the
/// small track, with a chicane on the back section. All joins are exact
/// quarter-arc tangents.
fn large_track() -> RoadGraph {
    let mut net = RoadGraph { segments: vec![] };

    // 1 - Start/finish straight
    net.add_lane(
        "a",
        "b",
        Lane::straight(p(42.0, 0.0), p(150.0, 0.0), [Continuous, Striped], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "a",
        "b",
        Lane::straight(p(42.0, 5.0), p(150.0, 5.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 2 - Turn 1
    let center1 = p(150.0, -20.0);
    net.add_lane(
        "b",
        "c",
        Lane::circular(center1, 20.0, rad(90.0), rad(0.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "b",
        "c",
        Lane::circular(center1, 25.0, rad(90.0), rad(0.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 3 - Right-hand straight
    net.add_lane(
        "c",
        "d",
        Lane::straight(p(170.0, -20.0), p(170.0, -80.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "c",
        "d",
        Lane::straight(p(175.0, -20.0), p(175.0, -80.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 4 - Turn 2
    let center2 = p(150.0, -80.0);
    net.add_lane(
        "d",
        "e",
        Lane::circular(center2, 20.0, rad(0.0), rad(-90.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "d",
        "e",
        Lane::circular(center2, 25.0, rad(0.0), rad(-90.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 5 - Back straight
    net.add_lane(
        "e",
        "f",
        Lane::straight(p(150.0, -100.0), p(80.0, -100.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "e",
        "f",
        Lane::straight(p(150.0, -105.0), p(80.0, -105.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 6 - Turn 3
    let center3 = p(80.0, -80.0);
    net.add_lane(
        "f",
        "g",
        Lane::circular(center3, 20.0, rad(270.0), rad(180.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "f",
        "g",
        Lane::circular(center3, 25.0, rad(270.0), rad(180.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 7 - Chicane entry
    net.add_lane(
        "g",
        "h",
        Lane::straight(p(60.0, -80.0), p(60.0, -60.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "g",
        "h",
        Lane::straight(p(55.0, -80.0), p(55.0, -60.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 8 - Chicane apex, the only right-hander on the back section
    let center4 = p(40.0, -60.0);
    net.add_lane(
        "h",
        "i",
        Lane::circular(center4, 20.0, rad(0.0), rad(90.0), true, [Continuous, Striped], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "h",
        "i",
        Lane::circular(center4, 15.0, rad(0.0), rad(90.0), true, [NO_LINE, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 9 - Chicane exit straight
    net.add_lane(
        "i",
        "j",
        Lane::straight(p(40.0, -40.0), p(-40.0, -40.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "i",
        "j",
        Lane::straight(p(40.0, -45.0), p(-40.0, -45.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 10 - Turn 5
    let center5 = p(-40.0, -20.0);
    net.add_lane(
        "j",
        "k",
        Lane::circular(center5, 20.0, rad(270.0), rad(180.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "j",
        "k",
        Lane::circular(center5, 25.0, rad(270.0), rad(180.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 11 - Far-side straight
    net.add_lane(
        "k",
        "l",
        Lane::straight(p(-60.0, -20.0), p(-60.0, 30.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "k",
        "l",
        Lane::straight(p(-65.0, -20.0), p(-65.0, 30.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 12 - Turn 6
    let center6 = p(-40.0, 30.0);
    net.add_lane(
        "l",
        "m",
        Lane::circular(center6, 20.0, rad(180.0), rad(90.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "l",
        "m",
        Lane::circular(center6, 25.0, rad(180.0), rad(90.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 13 - Lower straight
    net.add_lane(
        "m",
        "n",
        Lane::straight(p(-40.0, 50.0), p(10.0, 50.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "m",
        "n",
        Lane::straight(p(-40.0, 55.0), p(10.0, 55.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 14 - Turn 7, tightest corner of the circuit
    let center7 = p(10.0, 38.0);
    net.add_lane(
        "n",
        "o",
        Lane::circular(center7, 12.0, rad(90.0), rad(0.0), false, [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "n",
        "o",
        Lane::circular(center7, 17.0, rad(90.0), rad(0.0), false, [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 15 - Pit straight approach
    net.add_lane(
        "o",
        "p",
        Lane::straight(p(22.0, 38.0), p(22.0, 20.0), [Continuous, NO_LINE], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "o",
        "p",
        Lane::straight(p(27.0, 38.0), p(27.0, 20.0), [Striped, Continuous], WIDTH, SPEED_LIMIT),
    );

    // 16 - Final corner, reconnects to the start
    let center8 = p(42.0, 20.0);
    net.add_lane(
        "p",
        "a",
        Lane::circular(center8, 20.0, rad(180.0), rad(270.0), true, [Continuous, Striped], WIDTH, SPEED_LIMIT),
    );
    net.add_lane(
        "p",
        "a",
        Lane::circular(center8, 15.0, rad(180.0), rad(270.0), true, [NO_LINE, Continuous], WIDTH, SPEED_LIMIT),
    );

    net
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::MetricSpace;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn both_topologies_form_a_closed_cycle() {
        for topology in [Topology::Small, Topology::Large] {
            let graph = RoadGraph::build(topology);
            assert!(graph.is_closed_cycle());
        }
    }

    #[test]
    fn cycle_traverses_every_segment_once() {
        let graph = RoadGraph::build(Topology::Small);
        let (mut node, count) = ("a", graph.segment_count());
        for _ in 0..count {
            let (id, _) = graph
                .segments()
                .find(|(id, _)| id.from == node)
                .expect("dangling node");
            node = id.to;
        }
        assert_eq!(node, "a");
    }

    #[test]
    fn segment_counts() {
        assert_eq!(RoadGraph::build(Topology::Small).segment_count(), 9);
        assert_eq!(RoadGraph::build(Topology::Large).segment_count(), 16);
    }

    #[test]
    fn every_segment_has_two_positive_length_lanes() {
        for topology in [Topology::Small, Topology::Large] {
            let graph = RoadGraph::build(topology);
            for (_, lanes) in graph.segments() {
                assert_eq!(lanes.len(), 2);
                for lane in lanes {
                    assert!(lane.length() > 0.0);
                }
            }
        }
    }

    #[test]
    fn start_and_feeder_segments_exist() {
        for topology in [Topology::Small, Topology::Large] {
            let graph = RoadGraph::build(topology);
            for index in 0..2 {
                assert!(graph
                    .get_lane(LaneId {
                        segment: START_SEGMENT,
                        index
                    })
                    .is_some());
                assert!(graph
                    .get_lane(LaneId {
                        segment: FEEDER_SEGMENT,
                        index
                    })
                    .is_some());
            }
        }
    }

    #[test]
    fn consecutive_segments_join_geometrically() {
        // The small track is hand-fitted with seams of up to ~2.6m on the
        // outer lane; the large track joins are exact.
        for (topology, tolerance) in [(Topology::Small, 3.0), (Topology::Large, 1e-6)] {
            let graph = RoadGraph::build(topology);
            let segments: Vec<_> = graph.segments().collect();
            let wrap = [*segments.last().unwrap(), segments[0]];
            for window in segments.windows(2).chain(std::iter::once(&wrap[..])) {
                let (_, lanes) = window[0];
                let (_, next_lanes) = window[1];
                for (lane, next) in lanes.iter().zip(next_lanes) {
                    let end = lane.position(lane.length(), 0.0);
                    let start = next.position(0.0, 0.0);
                    assert!(
                        end.distance(start) <= tolerance,
                        "seam of {topology:?} exceeds {tolerance}: {end:?} vs {start:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn start_straight_carries_the_standard_markings() {
        let graph = RoadGraph::build(Topology::Small);
        let outer = graph.lane(LaneId::new("a", "b", 0));
        let inner = graph.lane(LaneId::new("a", "b", 1));
        assert_eq!(outer.lines(), [Continuous, Striped]);
        assert_eq!(inner.lines(), [Striped, Continuous]);
        for lane in [outer, inner] {
            assert_eq!(lane.width(), WIDTH);
            assert_eq!(lane.speed_limit(), SPEED_LIMIT);
        }
    }

    #[test]
    fn random_lane_is_always_resolvable() {
        let graph = RoadGraph::build(Topology::Large);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = graph.random_lane(&mut rng);
            assert!(graph.get_lane(id).is_some());
        }
    }

    #[test]
    #[should_panic(expected = "no lane")]
    fn unknown_lane_lookup_panics() {
        let graph = RoadGraph::build(Topology::Small);
        graph.lane(LaneId::new("a", "z", 0));
    }
}
