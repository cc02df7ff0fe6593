//! Static partition of the field into named polygons.
//!
//! Every zone is built from ten palette points in the first quadrant, mirrored
//! across the axes. Each half carries ten fine zones plus one coarse zone
//! covering the whole half.

use serde::{Deserialize, Serialize};

use crate::{FieldGeometry, Half, Polygon, Vector2};

/// Where a zone sits within its half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneArea {
    NorthCorner,
    NorthSecondPost,
    NorthFront,
    NorthGoal,
    Center,
    Middle,
    SouthCorner,
    SouthSecondPost,
    SouthFront,
    SouthGoal,
    Whole,
}

impl ZoneArea {
    /// All areas, fine ones first.
    pub const ALL: [ZoneArea; 11] = [
        ZoneArea::NorthCorner,
        ZoneArea::NorthSecondPost,
        ZoneArea::NorthFront,
        ZoneArea::NorthGoal,
        ZoneArea::Center,
        ZoneArea::Middle,
        ZoneArea::SouthCorner,
        ZoneArea::SouthSecondPost,
        ZoneArea::SouthFront,
        ZoneArea::SouthGoal,
        ZoneArea::Whole,
    ];

    pub fn is_fine(&self) -> bool {
        !matches!(self, ZoneArea::Whole)
    }

    /// The same area on the other side of the x axis.
    pub fn mirror_y(&self) -> Self {
        match self {
            ZoneArea::NorthCorner => ZoneArea::SouthCorner,
            ZoneArea::NorthSecondPost => ZoneArea::SouthSecondPost,
            ZoneArea::NorthFront => ZoneArea::SouthFront,
            ZoneArea::NorthGoal => ZoneArea::SouthGoal,
            ZoneArea::SouthCorner => ZoneArea::NorthCorner,
            ZoneArea::SouthSecondPost => ZoneArea::NorthSecondPost,
            ZoneArea::SouthFront => ZoneArea::NorthFront,
            ZoneArea::SouthGoal => ZoneArea::NorthGoal,
            other => *other,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    fn name(&self) -> &'static str {
        match self {
            ZoneArea::NorthCorner => "NORTH_CORNER",
            ZoneArea::NorthSecondPost => "NORTH_SECONDPOST",
            ZoneArea::NorthFront => "NORTH_FRONT",
            ZoneArea::NorthGoal => "NORTH_GOAL",
            ZoneArea::Center => "CENTER",
            ZoneArea::Middle => "MIDDLE",
            ZoneArea::SouthCorner => "SOUTH_CORNER",
            ZoneArea::SouthSecondPost => "SOUTH_SECONDPOST",
            ZoneArea::SouthFront => "SOUTH_FRONT",
            ZoneArea::SouthGoal => "SOUTH_GOAL",
            ZoneArea::Whole => "WHOLE",
        }
    }
}

/// A zone on an absolute half of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldZone {
    pub half: Half,
    pub area: ZoneArea,
}

impl FieldZone {
    pub const fn new(half: Half, area: ZoneArea) -> Self {
        Self { half, area }
    }

    fn index(&self) -> usize {
        let half = match self.half {
            Half::East => 0,
            Half::West => 1,
        };
        half * ZoneArea::ALL.len() + self.area.index()
    }
}

impl std::fmt::Display for FieldZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.half, self.area.name())
    }
}

/// The first-quadrant points every zone is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZonePalette {
    pub a: Vector2,
    pub b: Vector2,
    pub c: Vector2,
    pub d: Vector2,
    pub e: Vector2,
    pub f: Vector2,
    pub g: Vector2,
    pub h: Vector2,
    pub i: Vector2,
    pub j: Vector2,
}

impl ZonePalette {
    pub fn new(geom: &FieldGeometry) -> Self {
        let half_l = geom.half_length();
        let half_w = geom.half_width();
        let r = geom.defense_radius;
        let s = geom.defense_stretch;
        let front_x = (half_l - r) * 0.68;
        let inner_y = s / 2.0 + 0.4 * r;

        Self {
            a: Vector2::new(half_l, half_w),
            b: Vector2::new(front_x, half_w),
            c: Vector2::new(0.0, half_w),
            d: Vector2::new(half_l, r + s / 2.0),
            e: Vector2::new(half_l - r / 2.0, r + s / 2.0),
            f: Vector2::new(half_l - r, inner_y),
            g: Vector2::new(front_x, inner_y),
            h: Vector2::new(0.0, inner_y),
            i: Vector2::new(half_l, 0.0),
            j: Vector2::new(half_l - r, 0.0),
        }
    }

    /// Outline of an east-half area, north areas in the first quadrant.
    fn east_outline(&self, area: ZoneArea) -> Vec<Vector2> {
        let south = |p: Vector2| Vector2::new(p.x, -p.y);
        match area {
            ZoneArea::NorthCorner => vec![self.a, self.b, self.e, self.d],
            ZoneArea::NorthSecondPost => vec![self.e, self.b, self.g, self.f],
            ZoneArea::NorthFront => vec![self.b, self.c, self.h, self.g],
            ZoneArea::NorthGoal => vec![self.d, self.e, self.f, self.j, self.i],
            ZoneArea::Center => vec![self.f, self.g, south(self.g), south(self.f)],
            ZoneArea::Middle => vec![self.g, self.h, south(self.h), south(self.g)],
            ZoneArea::Whole => vec![self.a, self.c, south(self.c), south(self.a)],
            north_mirror => self
                .east_outline(north_mirror.mirror_y())
                .into_iter()
                .map(south)
                .collect(),
        }
    }
}

/// All zones for a given field geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldZones {
    palette: ZonePalette,
    polygons: Vec<Polygon>,
}

impl FieldZones {
    pub fn new(geom: &FieldGeometry) -> Self {
        let palette = ZonePalette::new(geom);
        let mut polygons = Vec::with_capacity(2 * ZoneArea::ALL.len());
        for half in [Half::East, Half::West] {
            for area in ZoneArea::ALL {
                let outline = palette
                    .east_outline(area)
                    .into_iter()
                    .map(|p| Vector2::new(half.sign() * p.x, p.y))
                    .collect();
                polygons.push(Polygon::new(outline));
            }
        }
        Self { palette, polygons }
    }

    pub fn palette(&self) -> &ZonePalette {
        &self.palette
    }

    pub fn polygon(&self, zone: FieldZone) -> &Polygon {
        &self.polygons[zone.index()]
    }

    pub fn centroid(&self, zone: FieldZone) -> Vector2 {
        self.polygon(zone).centroid()
    }

    pub fn contains(&self, zone: FieldZone, p: Vector2) -> bool {
        self.polygon(zone).contains(p)
    }

    /// The first fine zone containing the point.
    pub fn locate(&self, p: Vector2) -> Option<FieldZone> {
        [Half::East, Half::West]
            .into_iter()
            .flat_map(|half| {
                ZoneArea::ALL
                    .into_iter()
                    .filter(ZoneArea::is_fine)
                    .map(move |area| FieldZone::new(half, area))
            })
            .find(|zone| self.contains(*zone, p))
    }
}
