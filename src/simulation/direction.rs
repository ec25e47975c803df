use super::{Point, Vec2};
use crate::config::GeometryConfig;

/// Direction of travel. Fixed for the lifetime of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Eastbound,
    Westbound,
    Northbound,
    Southbound,
}

/// Compass side of the junction that traffic arrives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Approach {
    North,
    South,
    East,
    West,
}

/// One of the two opposing phase pairs of the signal group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalPair {
    NorthSouth,
    EastWest,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Eastbound,
        Direction::Westbound,
        Direction::Northbound,
        Direction::Southbound,
    ];

    /// Unit vector of travel. The plane's y axis grows southward.
    pub fn heading(self) -> Vec2 {
        match self {
            Direction::Eastbound => Vec2::new(1.0, 0.0),
            Direction::Westbound => Vec2::new(-1.0, 0.0),
            Direction::Southbound => Vec2::new(0.0, 1.0),
            Direction::Northbound => Vec2::new(0.0, -1.0),
        }
    }

    pub fn rotation_degrees(self) -> f32 {
        match self {
            Direction::Eastbound => 0.0,
            Direction::Southbound => 90.0,
            Direction::Westbound => 180.0,
            Direction::Northbound => 270.0,
        }
    }

    pub fn approach(self) -> Approach {
        match self {
            Direction::Southbound => Approach::North,
            Direction::Northbound => Approach::South,
            Direction::Westbound => Approach::East,
            Direction::Eastbound => Approach::West,
        }
    }

    pub fn pair(self) -> SignalPair {
        self.approach().pair()
    }

    pub fn progress(self, position: &Point) -> f32 {
        position.coords.dot(&self.heading())
    }

    /// Signed distance still to travel before reaching the junction centre.
    /// Negative once the vehicle has passed the centre.
    pub fn distance_to_junction(self, position: &Point, geometry: &GeometryConfig) -> f32 {
        let centre = Point::new(geometry.junction_x(), geometry.junction_y());
        (centre - position).dot(&self.heading())
    }

    pub fn entry_point(self, geometry: &GeometryConfig) -> Point {
        let jx = geometry.junction_x();
        let jy = geometry.junction_y();
        let lane = geometry.lane_offset;
        let margin = geometry.entry_margin;

        match self {
            Direction::Eastbound => Point::new(-margin, jy + lane),
            Direction::Westbound => Point::new(geometry.plane_width + margin, jy - lane),
            Direction::Southbound => Point::new(jx - lane, -margin),
            Direction::Northbound => Point::new(jx + lane, geometry.plane_height + margin),
        }
    }

    /// Point in this direction's lane that is `distance` short of the junction centre.
    pub fn lane_point(self, distance: f32, geometry: &GeometryConfig) -> Point {
        let entry = self.entry_point(geometry);
        let entry_distance = self.distance_to_junction(&entry, geometry);
        entry + self.heading() * (entry_distance - distance)
    }

    /// Distance past the junction centre at which a vehicle leaves the plane.
    pub fn exit_distance(self, geometry: &GeometryConfig) -> f32 {
        let half_extent = match self.pair() {
            SignalPair::EastWest => geometry.junction_x(),
            SignalPair::NorthSouth => geometry.junction_y(),
        };
        half_extent + geometry.exit_margin
    }
}

impl Approach {
    pub const ALL: [Approach; 4] = [Approach::North, Approach::South, Approach::East, Approach::West];

    /// Direction of travel of the traffic arriving on this approach.
    pub fn inbound(self) -> Direction {
        match self {
            Approach::North => Direction::Southbound,
            Approach::South => Direction::Northbound,
            Approach::East => Direction::Westbound,
            Approach::West => Direction::Eastbound,
        }
    }

    pub fn pair(self) -> SignalPair {
        match self {
            Approach::North | Approach::South => SignalPair::NorthSouth,
            Approach::East | Approach::West => SignalPair::EastWest,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Approach::North => "north",
            Approach::South => "south",
            Approach::East => "east",
            Approach::West => "west",
        }
    }
}

impl SignalPair {
    pub fn other(self) -> SignalPair {
        match self {
            SignalPair::NorthSouth => SignalPair::EastWest,
            SignalPair::EastWest => SignalPair::NorthSouth,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalPair::NorthSouth => "North-South",
            SignalPair::EastWest => "East-West",
        }
    }
}

/// One value per compass approach.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproachSet<T> {
    pub north: T,
    pub south: T,
    pub east: T,
    pub west: T,
}

impl<T> ApproachSet<T> {
    pub fn from_fn(mut f: impl FnMut(Approach) -> T) -> Self {
        Self {
            north: f(Approach::North),
            south: f(Approach::South),
            east: f(Approach::East),
            west: f(Approach::West),
        }
    }

    pub fn get(&self, approach: Approach) -> &T {
        match approach {
            Approach::North => &self.north,
            Approach::South => &self.south,
            Approach::East => &self.east,
            Approach::West => &self.west,
        }
    }

    pub fn get_mut(&mut self, approach: Approach) -> &mut T {
        match approach {
            Approach::North => &mut self.north,
            Approach::South => &mut self.south,
            Approach::East => &mut self.east,
            Approach::West => &mut self.west,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Approach, &T)> {
        Approach::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}
