//! Notification entity.
//!
//! Records are immutable after creation except for the `is_read` flag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of object a notification points at.
///
/// Readers resolve the `(target_kind, target_id)` pair explicitly; there is
/// no generic runtime lookup.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TargetKind {
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub recipient_id: String,

    /// The user whose action triggered the notification
    pub actor_id: String,

    /// Short description of the action, e.g. "liked your post"
    pub verb: String,

    /// What kind of object the notification refers to
    #[sea_orm(nullable)]
    pub target_kind: Option<TargetKind>,

    /// ID of the target object
    #[sea_orm(nullable)]
    pub target_id: Option<String>,

    /// Extra context for the client
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
