use serde::{Deserialize, Serialize};

use crate::{
    math, Angle, FieldGeometry, FieldZone, FieldZones, GameStateData, Half, PlayerId, TeamColor,
    TeamInfo, Vector2,
};

/// A struct to store the ball state from a single frame.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BallData {
    /// Capture time of the frame this data was extracted from, in seconds
    pub timestamp: f64,
    /// Position of the ball filtered by us, in mm
    pub position: Vector2,
    /// Raw position as reported by vision
    pub raw_position: Vector2,
    /// Velocity of the ball in mm/s
    pub velocity: Vector2,
}

/// A struct to store the player state from a single frame.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlayerData {
    /// Capture time of the frame this data was extracted from, in seconds
    pub timestamp: f64,
    /// The player's unique id
    pub id: PlayerId,
    pub color: TeamColor,
    /// Unfiltered position as reported by vision
    pub raw_position: Vector2,
    /// Position of the player filtered by us in mm
    pub position: Vector2,
    /// Velocity of the player in mm/s
    pub velocity: Vector2,
    /// Yaw of the player, where `0` is the positive x direction, and `pi/2` is
    /// the positive y direction.
    pub yaw: Angle,
    /// Unfiltered yaw as reported by vision
    pub raw_yaw: Angle,
    /// Set once the player has not been seen for a while
    pub is_gone: bool,
}

impl PlayerData {
    pub fn new(id: PlayerId, color: TeamColor) -> Self {
        Self {
            timestamp: 0.0,
            id,
            color,
            raw_position: Vector2::zeros(),
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            yaw: Angle::default(),
            raw_yaw: Angle::default(),
            is_gone: false,
        }
    }
}

/// An immutable snapshot of the world, rebuilt for every tick.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorldData {
    /// Time between the last two frames, in seconds
    pub dt: f64,
    /// Capture time of the latest frame
    pub t_capture: f64,
    pub own_color: TeamColor,
    /// The half containing our own goal
    pub own_half: Half,
    pub own_players: Vec<PlayerData>,
    pub opp_players: Vec<PlayerData>,
    pub ball: Option<BallData>,
    pub field_geom: FieldGeometry,
    pub zones: FieldZones,
    pub game_state: GameStateData,
    pub own_team: TeamInfo,
    pub opp_team: TeamInfo,
}

impl WorldData {
    /// An empty world on the given field.
    pub fn new(own_color: TeamColor, own_half: Half, field_geom: FieldGeometry) -> Self {
        Self {
            dt: 0.0,
            t_capture: 0.0,
            own_color,
            own_half,
            own_players: Vec::new(),
            opp_players: Vec::new(),
            ball: None,
            zones: FieldZones::new(&field_geom),
            field_geom,
            game_state: GameStateData::default(),
            own_team: TeamInfo::default(),
            opp_team: TeamInfo::default(),
        }
    }

    pub fn opp_half(&self) -> Half {
        self.own_half.opposite()
    }

    pub fn own_player(&self, id: PlayerId) -> Option<&PlayerData> {
        self.own_players.iter().find(|p| p.id == id)
    }

    pub fn ball_position(&self) -> Option<Vector2> {
        self.ball.as_ref().map(|b| b.position)
    }

    pub fn own_goal_center(&self) -> Vector2 {
        self.field_geom.goal_center(self.own_half)
    }

    pub fn opp_goal_center(&self) -> Vector2 {
        self.field_geom.goal_center(self.opp_half())
    }

    /// The zone the point lies in, if it is on the field.
    pub fn locate(&self, p: Vector2) -> Option<FieldZone> {
        self.zones.locate(p)
    }

    /// The own player closest to a point, among those passing `filter`.
    pub fn closest_own_player_to(
        &self,
        p: Vector2,
        filter: impl Fn(&PlayerData) -> bool,
    ) -> Option<&PlayerData> {
        closest_to(self.own_players.iter().filter(|pl| filter(pl)), p)
    }

    pub fn closest_opp_player_to(&self, p: Vector2) -> Option<&PlayerData> {
        closest_to(self.opp_players.iter(), p)
    }

    /// Whether one of our robots is the closest robot to the ball and within
    /// `max_distance` of it.
    pub fn ally_has_ball(&self, max_distance: f64) -> bool {
        let Some(ball) = self.ball_position() else {
            return false;
        };
        let all = self.own_players.iter().chain(self.opp_players.iter());
        match closest_to(all, ball) {
            Some(closest) => {
                closest.color == self.own_color
                    && math::distance(closest.position, ball) <= max_distance
            }
            None => false,
        }
    }

    /// Opponents currently standing in a zone.
    pub fn opp_players_in_zone(&self, zone: FieldZone) -> impl Iterator<Item = &PlayerData> {
        self.opp_players
            .iter()
            .filter(move |p| self.zones.contains(zone, p.position))
    }

    pub fn is_ball_in_zone(&self, zone: FieldZone) -> bool {
        self.ball_position()
            .map(|b| self.zones.contains(zone, b))
            .unwrap_or(false)
    }

    /// Whether the ball is on the half we defend.
    pub fn is_ball_in_own_half(&self) -> bool {
        self.ball_position()
            .map(|b| Half::of(b) == self.own_half)
            .unwrap_or(false)
    }
}

fn closest_to<'a>(
    players: impl Iterator<Item = &'a PlayerData>,
    p: Vector2,
) -> Option<&'a PlayerData> {
    players
        .filter(|pl| !pl.is_gone)
        .min_by(|a, b| {
            math::distance(a.position, p)
                .partial_cmp(&math::distance(b.position, p))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
