//! 点赞状态机
//!
//! 每个 (用户, 目标) 至多一条点赞记录；`None` 表示没有记录。
//! 状态变更的判定是纯函数，插入/替换/删除由仓储层落地。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{Timestamp, UserId};

/// 点赞状态。`None` 不落库，表示记录缺失。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LikeStatus {
    None,
    Like,
    Dislike,
}

impl LikeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeStatus::None => "None",
            LikeStatus::Like => "Like",
            LikeStatus::Dislike => "Dislike",
        }
    }
}

/// 点赞目标类型，post 点赞与 comment 点赞共用同一张表和同一状态机。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LikeTarget {
    Post,
    Comment,
}

impl LikeTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeTarget::Post => "post",
            LikeTarget::Comment => "comment",
        }
    }
}

/// 已落库的点赞记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub target: LikeTarget,
    pub target_id: Uuid,
    pub user_id: UserId,
    /// 写入时的用户登录名快照
    pub user_login: String,
    /// 只会是 Like 或 Dislike
    pub status: LikeStatus,
    pub added_at: Timestamp,
}

/// 点赞计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeCounts {
    pub likes: u64,
    pub dislikes: u64,
}

/// 状态变更计划。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTransition {
    /// 当前状态即目标状态，什么都不做（幂等）
    Keep,
    /// 写入新状态，时间戳取当前时刻
    Upsert(LikeStatus),
    /// 删除现有记录
    Remove,
}

impl LikeTransition {
    /// 根据现有状态和请求状态得出变更计划。
    ///
    /// 替换（状态不同且新状态非 None）同样走 Upsert：
    /// 仓储层用唯一索引上的 upsert 落地，避免读后写竞态产生重复行。
    pub fn plan(current: LikeStatus, requested: LikeStatus) -> Self {
        if current == requested {
            return LikeTransition::Keep;
        }
        match requested {
            LikeStatus::None => LikeTransition::Remove,
            status => LikeTransition::Upsert(status),
        }
    }
}
