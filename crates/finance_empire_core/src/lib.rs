pub mod domain;
pub mod ports;

pub use domain::{
    AuthPayload, GameData, LeaderboardEntry, LoginRequest, RegisterRequest, SaveRequest, User,
    UserPosition,
};
pub use ports::{Clock, GameApiService, KeyValueStore, PortError, PortResult};
