use serde::{Deserialize, Serialize};

/// Target gameplay counts a generated level should offer, measured from how a
/// player actually played.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerProfile {
    pub coins: u32,
    pub jumps: u32,
    pub kills: u32,
}

impl PlayerProfile {
    pub fn new(coins: u32, jumps: u32, kills: u32) -> Self {
        Self {
            coins,
            jumps,
            kills,
        }
    }
}
