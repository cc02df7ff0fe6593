use holland_core::{
    BallData, GameState, GameStateData, RefereeCommand, RefereeMsg, TeamColor, Vector2,
};

/// Distance the ball has to travel for a restart to count as taken, in mm.
const BALL_MOVED_DISTANCE: f64 = 100.0;
/// Seconds after which a restart goes on even if nobody touched the ball.
const RESTART_TIMEOUT: f64 = 10.0;

/// Waits for the ball to move after a kickoff, free kick or penalty.
#[derive(Debug, Clone, Copy)]
struct BallMovementCheck {
    init_ball_pos: Vector2,
    start: f64,
    on_movement: GameState,
    on_timeout: GameState,
}

#[derive(Debug, Clone)]
pub struct GameStateTracker {
    game_state: GameState,
    operating_team: Option<TeamColor>,
    direct_free_kick: bool,
    last_cmd: Option<RefereeCommand>,
    movement_check: Option<BallMovementCheck>,
}

impl GameStateTracker {
    pub fn new() -> GameStateTracker {
        GameStateTracker {
            game_state: GameState::Halt,
            operating_team: None,
            direct_free_kick: false,
            last_cmd: None,
            movement_check: None,
        }
    }

    /// Apply a referee message. Repeated commands are ignored.
    pub fn update(&mut self, msg: &RefereeMsg) -> GameState {
        let command = msg.command;
        if self.last_cmd == Some(command) {
            return self.game_state;
        }
        log::info!("Referee command: {:?}", command);
        self.last_cmd = Some(command);

        let last_game_state = self.game_state;
        self.game_state = match command {
            RefereeCommand::Halt => GameState::Halt,
            RefereeCommand::Stop => GameState::Stop,
            RefereeCommand::NormalStart => match self.game_state {
                GameState::PrepareKickoff => GameState::Kickoff,
                GameState::PreparePenalty => GameState::Penalty,
                _ => GameState::Run,
            },
            RefereeCommand::ForceStart => GameState::Run,
            RefereeCommand::PrepareKickoff(_) => GameState::PrepareKickoff,
            RefereeCommand::PreparePenalty(_) => GameState::PreparePenalty,
            RefereeCommand::DirectFree(_) | RefereeCommand::IndirectFree(_) => GameState::FreeKick,
            RefereeCommand::Timeout(_) => GameState::Timeout,
            RefereeCommand::BallPlacement(_, pos) => GameState::BallPlacement(pos),
            RefereeCommand::Goal(_) => self.game_state,
        };

        if last_game_state != self.game_state {
            log::info!("Game state {} -> {}", last_game_state, self.game_state);
        }

        match command {
            RefereeCommand::PrepareKickoff(c)
            | RefereeCommand::PreparePenalty(c)
            | RefereeCommand::DirectFree(c)
            | RefereeCommand::IndirectFree(c)
            | RefereeCommand::BallPlacement(c, _) => self.operating_team = Some(c),
            _ => {}
        }
        match command {
            RefereeCommand::DirectFree(_) => self.direct_free_kick = true,
            RefereeCommand::IndirectFree(_) => self.direct_free_kick = false,
            _ => {}
        }

        // Reset
        match self.game_state {
            GameState::Halt | GameState::Stop | GameState::Timeout | GameState::Run => {
                self.operating_team = None;
                self.movement_check = None;
            }
            _ => (),
        }

        self.game_state
    }

    /// Start waiting for the ball to move, if the current state is a restart.
    pub fn start_ball_movement_check(&mut self, ball_pos: Vector2, t: f64) {
        if self.movement_check.is_some() {
            return;
        }
        let (on_movement, on_timeout) = match self.game_state {
            GameState::Kickoff | GameState::FreeKick => (GameState::Run, GameState::Run),
            GameState::Penalty => (GameState::PenaltyRun, GameState::Stop),
            _ => return,
        };
        self.movement_check = Some(BallMovementCheck {
            init_ball_pos: ball_pos,
            start: t,
            on_movement,
            on_timeout,
        });
    }

    /// Leave a restart once the ball has moved or the restart timed out.
    pub fn update_ball_movement_check(&mut self, ball: Option<&BallData>, t: f64) -> GameState {
        let (Some(check), Some(ball)) = (self.movement_check, ball) else {
            return self.game_state;
        };
        let next = if t - check.start >= RESTART_TIMEOUT {
            Some(check.on_timeout)
        } else if (ball.position - check.init_ball_pos).norm() > BALL_MOVED_DISTANCE {
            Some(check.on_movement)
        } else {
            None
        };
        if let Some(next) = next {
            log::info!("Game state {} -> {}", self.game_state, next);
            self.game_state = next;
            self.movement_check = None;
            if next == GameState::Run || next == GameState::Stop {
                self.operating_team = None;
            }
        }
        self.game_state
    }

    pub fn get(&self) -> GameStateData {
        GameStateData {
            game_state: self.game_state,
            operating_team: self.operating_team,
            direct_free_kick: self.direct_free_kick,
        }
    }
}

impl Default for GameStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
