//! Event tags published by the board service.
//!
//! Kinds are free-form strings on the wire; these constants only keep
//! publishers and clients spelling them the same way.

pub const CONNECT: &str = "CONNECT";
pub const DISCONNECT: &str = "DISCONNECT";

pub const BOARD_UPDATED: &str = "BOARD_UPDATED";

pub const COLUMN_CREATED: &str = "COLUMN_CREATED";
pub const COLUMN_UPDATED: &str = "COLUMN_UPDATED";
pub const COLUMN_DELETED: &str = "COLUMN_DELETED";
pub const COLUMN_MOVED: &str = "COLUMN_MOVED";

pub const CARD_CREATED: &str = "CARD_CREATED";
pub const CARD_UPDATED: &str = "CARD_UPDATED";
pub const CARD_DELETED: &str = "CARD_DELETED";
pub const CARD_MOVED: &str = "CARD_MOVED";

pub const PRESENCE_UPDATE: &str = "PRESENCE_UPDATE";

// Personal room events
pub const INVITATION_RECEIVED: &str = "INVITATION_RECEIVED";
pub const ROLE_UPDATED: &str = "ROLE_UPDATED";
pub const NOTIFICATION_RECEIVED: &str = "NOTIFICATION_RECEIVED";
