use serde::{Deserialize, Serialize};

/// `dir`: 1 adds the caller's vote, 0 removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum VoteDirection {
    Remove,
    Add,
}

impl TryFrom<u8> for VoteDirection {
    type Error = String;

    fn try_from(dir: u8) -> Result<Self, Self::Error> {
        match dir {
            0 => Ok(VoteDirection::Remove),
            1 => Ok(VoteDirection::Add),
            other => Err(format!("dir must be 0 or 1, got {other}")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub post_id: i64,
    pub dir: VoteDirection,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResponse {
    pub message: String,
}
