//! Lazy handles over the interaction's resolved-entity tables
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! Option values for entity kinds arrive as raw id strings; the full objects
//! sit in the payload's resolved side tables. Each handle pairs the raw id
//! with a reference to those tables and resolves on demand — nothing is
//! copied eagerly, and the handles are purely read-only projections over
//! interaction-scoped data.

use crate::protocol::{Attachment, Member, Message, PartialChannel, ResolvedData, Role, User};

/// Parse a raw snowflake id, yielding 0 on malformed input. A malformed id
/// is a platform bug, not a local fault, so this never errors.
fn parse_snowflake(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}

macro_rules! entity_handle {
    ($(#[$doc:meta])* $name:ident, $table:ident, $entity:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name<'a> {
            id: String,
            resolved: Option<&'a ResolvedData>,
        }

        impl<'a> $name<'a> {
            pub(crate) fn new(id: impl Into<String>, resolved: Option<&'a ResolvedData>) -> Self {
                Self {
                    id: id.into(),
                    resolved,
                }
            }

            /// The raw identifier as supplied by the platform.
            pub fn id(&self) -> &str {
                &self.id
            }

            /// The identifier parsed as an integer, 0 on parse failure.
            pub fn snowflake(&self) -> u64 {
                parse_snowflake(&self.id)
            }

            /// Keyed lookup into the resolved table; `None` when the
            /// platform sent no matching record.
            pub fn resolve(&self) -> Option<&'a $entity> {
                self.resolved?.$table.get(&self.id)
            }
        }
    };
}

entity_handle!(
    /// Handle for a user-kind option value.
    UserHandle, users, User
);
entity_handle!(
    /// Handle for a role-kind option value.
    RoleHandle, roles, Role
);
entity_handle!(
    /// Handle for a channel-kind option value.
    ChannelHandle, channels, PartialChannel
);
entity_handle!(
    /// Handle for the target message of a message-targeted command.
    MessageHandle, messages, Message
);
entity_handle!(
    /// Handle for an attachment-kind option value.
    AttachmentHandle, attachments, Attachment
);

/// Handle for the polymorphic mentionable option kind, which may name any
/// entity the platform considers mentionable.
#[derive(Debug, Clone)]
pub struct MentionableHandle<'a> {
    id: String,
    resolved: Option<&'a ResolvedData>,
}

/// What a mentionable id resolved to.
#[derive(Debug, Clone)]
pub enum Mentionable<'a> {
    Channel(&'a PartialChannel),
    Role(&'a Role),
    /// A guild member, with the matching user record from the users table
    /// attached when present.
    Member {
        member: &'a Member,
        user: Option<&'a User>,
    },
    User(&'a User),
}

impl<'a> MentionableHandle<'a> {
    pub(crate) fn new(id: impl Into<String>, resolved: Option<&'a ResolvedData>) -> Self {
        Self {
            id: id.into(),
            resolved,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snowflake(&self) -> u64 {
        parse_snowflake(&self.id)
    }

    /// Lookup order is fixed: channel, then role, then member (with its
    /// user sub-record), then bare user. First hit wins.
    pub fn resolve(&self) -> Option<Mentionable<'a>> {
        let tables = self.resolved?;
        if let Some(channel) = tables.channels.get(&self.id) {
            return Some(Mentionable::Channel(channel));
        }
        if let Some(role) = tables.roles.get(&self.id) {
            return Some(Mentionable::Role(role));
        }
        if let Some(member) = tables.members.get(&self.id) {
            let user = member.user.as_ref().or_else(|| tables.users.get(&self.id));
            return Some(Mentionable::Member { member, user });
        }
        tables.users.get(&self.id).map(Mentionable::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ResolvedData {
        serde_json::from_value(serde_json::json!({
            "users": {
                "1": { "id": "1", "username": "ada" },
                "2": { "id": "2", "username": "grace" }
            },
            "members": {
                "2": { "nick": "adm", "roles": ["9"] }
            },
            "roles": {
                "3": { "id": "3", "name": "mods" }
            },
            "channels": {
                "4": { "id": "4", "name": "general", "type": 0 }
            },
            "attachments": {
                "5": { "id": "5", "filename": "a.png", "url": "https://x/a.png" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_snowflake_parses_or_zeroes() {
        let handle = UserHandle::new("123456", None);
        assert_eq!(handle.snowflake(), 123456);
        let handle = UserHandle::new("not-a-number", None);
        assert_eq!(handle.snowflake(), 0);
    }

    #[test]
    fn test_resolve_hit_and_miss() {
        let tables = tables();
        let hit = UserHandle::new("1", Some(&tables));
        assert_eq!(hit.resolve().unwrap().username, "ada");
        let miss = UserHandle::new("999", Some(&tables));
        assert!(miss.resolve().is_none());
        let detached = UserHandle::new("1", None);
        assert!(detached.resolve().is_none());
    }

    #[test]
    fn test_mentionable_prefers_channel_then_role() {
        let tables = tables();
        assert!(matches!(
            MentionableHandle::new("4", Some(&tables)).resolve(),
            Some(Mentionable::Channel(c)) if c.name.as_deref() == Some("general")
        ));
        assert!(matches!(
            MentionableHandle::new("3", Some(&tables)).resolve(),
            Some(Mentionable::Role(r)) if r.name == "mods"
        ));
    }

    #[test]
    fn test_mentionable_member_attaches_user_record() {
        let tables = tables();
        // Member "2" has no embedded user; the users table supplies it.
        match MentionableHandle::new("2", Some(&tables)).resolve() {
            Some(Mentionable::Member { member, user }) => {
                assert_eq!(member.nick.as_deref(), Some("adm"));
                assert_eq!(user.unwrap().username, "grace");
            }
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[test]
    fn test_mentionable_falls_back_to_bare_user() {
        let tables = tables();
        assert!(matches!(
            MentionableHandle::new("1", Some(&tables)).resolve(),
            Some(Mentionable::User(u)) if u.username == "ada"
        ));
        assert!(MentionableHandle::new("999", Some(&tables)).resolve().is_none());
    }
}
