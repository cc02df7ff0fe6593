use std::collections::HashMap;

mod ball;
pub mod filter;
mod game_state;
mod player;

pub use ball::BallTracker;
pub use game_state::GameStateTracker;
pub use player::PlayerTracker;

use holland_core::{
    ExecutorSettings, FieldGeometry, GameState, Half, PlayerData, PlayerId, RefereeMsg,
    TeamColor, TeamInfo, TrackerSettings, VisionFrame, WorldData,
};

/// A struct to track the world state.
pub struct WorldTracker {
    own_color: TeamColor,
    own_half: Half,
    own_players_tracker: HashMap<PlayerId, PlayerTracker>,
    opp_players_tracker: HashMap<PlayerId, PlayerTracker>,
    ball_tracker: BallTracker,
    game_state_tracker: GameStateTracker,
    /// Latest snapshot skeleton: field geometry and zones, rebuilt when new
    /// geometry arrives
    template: WorldData,
    field_geometry_received: bool,
    own_team: TeamInfo,
    opp_team: TeamInfo,
    /// The `t_capture` timestamp of the first frame received from vision, in seconds
    first_t_capture: Option<f64>,
    /// Capture timestamp of the last frame from vision, in seconds. This is relative to
    /// `first_t_capture`
    last_t_capture: Option<f64>,
    /// Duration between the last two frames
    dt: Option<f64>,
    tracker_settings: TrackerSettings,
}

impl WorldTracker {
    /// Create a new world tracker from a config.
    pub fn new(settings: &ExecutorSettings) -> Self {
        let tracker_settings = settings.tracker_settings.clone();
        let own_color = if tracker_settings.is_blue {
            TeamColor::Blue
        } else {
            TeamColor::Yellow
        };
        let own_half = tracker_settings.initial_own_half;
        Self {
            own_color,
            own_half,
            own_players_tracker: HashMap::new(),
            opp_players_tracker: HashMap::new(),
            ball_tracker: BallTracker::new(&tracker_settings),
            game_state_tracker: GameStateTracker::new(),
            template: WorldData::new(own_color, own_half, FieldGeometry::default()),
            field_geometry_received: false,
            own_team: TeamInfo::default(),
            opp_team: TeamInfo::default(),
            first_t_capture: None,
            last_t_capture: None,
            dt: None,
            tracker_settings,
        }
    }

    pub fn update_settings(&mut self, settings: &ExecutorSettings) {
        self.tracker_settings = settings.tracker_settings.clone();
        for player_tracker in self
            .own_players_tracker
            .values_mut()
            .chain(self.opp_players_tracker.values_mut())
        {
            player_tracker.update_settings(&self.tracker_settings);
        }
        self.ball_tracker.update_settings(&self.tracker_settings);
    }

    /// Replace the field geometry and rebuild the zones.
    pub fn update_geometry(&mut self, geometry: FieldGeometry) {
        if self.field_geometry_received && self.template.field_geom == geometry {
            return;
        }
        log::info!(
            "Field geometry {:.0} x {:.0}",
            geometry.field_length,
            geometry.field_width
        );
        self.template = WorldData::new(self.own_color, self.own_half, geometry);
        self.field_geometry_received = true;
    }

    /// Update the world state from a referee message.
    pub fn update_from_referee(&mut self, msg: &RefereeMsg) {
        let t = self.last_t_capture.unwrap_or(0.0);
        self.game_state_tracker
            .update_ball_movement_check(self.ball_tracker.get(), t);

        let cur = self.game_state_tracker.update(msg);
        if matches!(
            cur,
            GameState::Kickoff | GameState::FreeKick | GameState::Penalty
        ) {
            if let Some(ball) = self.ball_tracker.get() {
                self.game_state_tracker
                    .start_ball_movement_check(ball.position, t);
            } else {
                log::warn!("Ball not detected, cannot watch the restart");
            }
        }

        self.own_team = msg.team_info(self.own_color).clone();
        self.opp_team = msg.team_info(self.own_color.opposite()).clone();

        if let Some(blue_on_positive) = msg.blue_team_on_positive_half {
            let own_on_positive = blue_on_positive == (self.own_color == TeamColor::Blue);
            let own_half = if own_on_positive {
                Half::East
            } else {
                Half::West
            };
            if own_half != self.own_half {
                log::info!("Now defending the {} goal", own_half);
                self.own_half = own_half;
            }
        }
    }

    /// Update the world state from a vision frame.
    pub fn update_from_vision(&mut self, frame: &VisionFrame) {
        let t_capture = frame.t_capture;
        let first_t_capture = *self.first_t_capture.get_or_insert(t_capture);
        let t = t_capture - first_t_capture;
        if let Some(last) = self.last_t_capture {
            self.dt = Some(t - last);
        }
        self.last_t_capture = Some(t);

        for detection in &frame.robots {
            if !detection.id.is_valid() {
                log::debug!("Ignoring robot with id {}", detection.id);
                continue;
            }
            let trackers = if detection.color == self.own_color {
                &mut self.own_players_tracker
            } else {
                &mut self.opp_players_tracker
            };
            let settings = &self.tracker_settings;
            trackers
                .entry(detection.id)
                .or_insert_with(|| PlayerTracker::new(detection.id, detection.color, settings))
                .update(t, detection);
        }
        for tracker in self
            .own_players_tracker
            .values_mut()
            .chain(self.opp_players_tracker.values_mut())
        {
            tracker.check_is_gone(t);
        }

        let relative = VisionFrame {
            t_capture: t,
            balls: frame.balls.clone(),
            robots: Vec::new(),
        };
        self.ball_tracker.update(&relative);

        self.game_state_tracker
            .update_ball_movement_check(self.ball_tracker.get(), t);
    }

    /// Check if the world state is initialized.
    ///
    /// The world state is initialized if at least one own player and the ball have been
    /// seen at least twice, and the field geometry has been received.
    pub fn is_init(&self) -> bool {
        let any_player_init = self.own_players_tracker.values().any(|t| t.is_init());
        any_player_init && self.ball_tracker.is_init() && self.field_geometry_received
    }

    /// Get the current world state.
    pub fn get(&self) -> WorldData {
        let mut world = self.template.clone();
        world.dt = self.dt.unwrap_or(self.tracker_settings.tick_interval);
        world.t_capture = self.last_t_capture.unwrap_or(0.0);
        world.own_half = self.own_half;
        world.own_players = collect_players(&self.own_players_tracker);
        world.opp_players = collect_players(&self.opp_players_tracker);
        world.ball = self.ball_tracker.get().cloned();
        world.game_state = self.game_state_tracker.get();
        world.own_team = self.own_team.clone();
        world.opp_team = self.opp_team.clone();
        world
    }
}

fn collect_players(trackers: &HashMap<PlayerId, PlayerTracker>) -> Vec<PlayerData> {
    let mut players: Vec<PlayerData> = trackers.values().filter_map(|t| t.get().cloned()).collect();
    players.sort_by_key(|p| p.id);
    players
}
