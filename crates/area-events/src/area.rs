//! Area Metadata
//!
//! Static description of a public area: where it is, how many agents it can
//! hold, and how many co-occupants each observer is allowed to see.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::AreaId;

/// Default number of co-occupants an observer may see.
pub const DEFAULT_MAX_VISIBLE: usize = 20;

/// Kind of public area
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    Plaza,
    Cafe,
    Park,
    Shop,
    Library,
    Gym,
}

impl AreaType {
    /// Returns all area type variants.
    pub fn all() -> &'static [AreaType] {
        &[
            AreaType::Plaza,
            AreaType::Cafe,
            AreaType::Park,
            AreaType::Shop,
            AreaType::Library,
            AreaType::Gym,
        ]
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AreaType::Plaza => "plaza",
            AreaType::Cafe => "cafe",
            AreaType::Park => "park",
            AreaType::Shop => "shop",
            AreaType::Library => "library",
            AreaType::Gym => "gym",
        };
        f.write_str(name)
    }
}

/// Position of an area (or a facility inside it) on the city map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AreaPosition {
    pub x: i32,
    pub y: i32,
}

impl AreaPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True if `other` lies within `radius` on both axes.
    pub fn within(&self, other: &AreaPosition, radius: i32) -> bool {
        (self.x - other.x).abs() <= radius && (self.y - other.y).abs() <= radius
    }
}

/// A fixture inside an area (bench, counter, pond...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaFacility {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    /// Offset from the area's centre
    pub position: AreaPosition,
}

impl AreaFacility {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        facility_type: impl Into<String>,
        x: i32,
        y: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            facility_type: facility_type.into(),
            position: AreaPosition::new(x, y),
        }
    }
}

/// A public area agents can occupy concurrently
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub area_type: AreaType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: AreaPosition,
    /// Hard occupancy cap
    pub capacity: usize,
    /// Visibility cap per observer
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    #[serde(default)]
    pub facilities: Vec<AreaFacility>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_max_visible() -> usize {
    DEFAULT_MAX_VISIBLE
}

fn default_active() -> bool {
    true
}

impl Area {
    pub fn new(
        id: impl Into<AreaId>,
        name: impl Into<String>,
        area_type: AreaType,
        capacity: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            area_type,
            description: String::new(),
            position: AreaPosition::default(),
            capacity,
            max_visible: DEFAULT_MAX_VISIBLE,
            facilities: Vec::new(),
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = AreaPosition::new(x, y);
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible;
        self
    }

    pub fn with_facility(mut self, facility: AreaFacility) -> Self {
        self.facilities.push(facility);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
