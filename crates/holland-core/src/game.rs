use serde::{Deserialize, Serialize};

use crate::{PlayerId, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColor {
    Blue,
    Yellow,
}

impl TeamColor {
    /// Returns the opposite team color.
    pub fn opposite(&self) -> Self {
        match self {
            TeamColor::Blue => TeamColor::Yellow,
            TeamColor::Yellow => TeamColor::Blue,
        }
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamColor::Blue => write!(f, "blue"),
            TeamColor::Yellow => write!(f, "yellow"),
        }
    }
}

/// One half of the field. East is `+x`, West is `-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    East,
    West,
}

impl Half {
    pub fn opposite(&self) -> Self {
        match self {
            Half::East => Half::West,
            Half::West => Half::East,
        }
    }

    /// Sign of x on this half.
    pub fn sign(&self) -> f64 {
        match self {
            Half::East => 1.0,
            Half::West => -1.0,
        }
    }

    /// The half a point lies on. The centre line counts as East.
    pub fn of(p: Vector2) -> Self {
        if p.x >= 0.0 {
            Half::East
        } else {
            Half::West
        }
    }
}

impl std::fmt::Display for Half {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Half::East => write!(f, "EAST"),
            Half::West => write!(f, "WEST"),
        }
    }
}

/// A decoded referee command. The colour is the team the command is for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RefereeCommand {
    Halt,
    Stop,
    NormalStart,
    ForceStart,
    PrepareKickoff(TeamColor),
    PreparePenalty(TeamColor),
    DirectFree(TeamColor),
    IndirectFree(TeamColor),
    Timeout(TeamColor),
    Goal(TeamColor),
    BallPlacement(TeamColor, Vector2),
}

impl RefereeCommand {
    /// The team this command addresses, if any.
    pub fn team(&self) -> Option<TeamColor> {
        match self {
            RefereeCommand::Halt
            | RefereeCommand::Stop
            | RefereeCommand::NormalStart
            | RefereeCommand::ForceStart => None,
            RefereeCommand::PrepareKickoff(c)
            | RefereeCommand::PreparePenalty(c)
            | RefereeCommand::DirectFree(c)
            | RefereeCommand::IndirectFree(c)
            | RefereeCommand::Timeout(c)
            | RefereeCommand::Goal(c)
            | RefereeCommand::BallPlacement(c, _) => Some(*c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStage {
    #[default]
    PreGame,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    PenaltyShootout,
    PostGame,
}

/// Per-team bookkeeping carried by every referee message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamInfo {
    pub name: String,
    pub score: u32,
    pub red_cards: u32,
    pub yellow_cards: u32,
    /// Timeouts left
    pub timeouts: u32,
    /// The designated keeper
    pub goalie: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefereeMsg {
    pub command: RefereeCommand,
    pub stage: GameStage,
    pub blue: TeamInfo,
    pub yellow: TeamInfo,
    /// Whether blue defends the `+x` goal. `None` when the referee does not say.
    pub blue_team_on_positive_half: Option<bool>,
}

impl RefereeMsg {
    pub fn new(command: RefereeCommand) -> Self {
        Self {
            command,
            stage: GameStage::default(),
            blue: TeamInfo::default(),
            yellow: TeamInfo::default(),
            blue_team_on_positive_half: None,
        }
    }

    pub fn team_info(&self, color: TeamColor) -> &TeamInfo {
        match color {
            TeamColor::Blue => &self.blue,
            TeamColor::Yellow => &self.yellow,
        }
    }
}

/// The game state, as tracked from referee commands.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Copy, Default)]
#[serde(tag = "type", content = "data")]
pub enum GameState {
    #[default]
    Unknown,
    Halt,
    Timeout,
    Stop,
    PrepareKickoff,
    BallPlacement(Vector2),
    PreparePenalty,
    Kickoff,
    FreeKick,
    Penalty,
    PenaltyRun,
    Run,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::BallPlacement(p) => write!(f, "BallPlacement({:.0}, {:.0})", p.x, p.y),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct GameStateData {
    /// The state of current game
    pub game_state: GameState,
    /// The team carrying out the current restart. `None` for symmetric states.
    pub operating_team: Option<TeamColor>,
    /// Whether the current free kick may be shot directly at the goal
    pub direct_free_kick: bool,
}

impl GameStateData {
    /// Whether `team` is the one carrying out the current restart.
    pub fn is_operating(&self, team: TeamColor) -> bool {
        self.operating_team == Some(team)
    }
}

/// A game situation with its own role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Situation {
    ZonallyForward,
    ZonallyBackward,
    BarricadeDefending,
    ForwardDefending,
    FreeShotRoundPlay,
    KickoffPrepare,
    KickoffDefending,
    PenaltyAttack,
    PenaltyDefense,
    DirectFreeKickAttack,
    FreeKickForward,
    DirectFreeKickDefense,
    IndirectFreeKickDefense,
    FreeKickDefending,
}

impl std::fmt::Display for Situation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
