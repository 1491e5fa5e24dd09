//! Closed command enumerations.
//!
//! Tags parse from the wire string with `parse`; an unrecognized tag yields
//! `None` so the router can log and drop it without failing envelope decode.

/// Top-level command tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The only recognized top-level command; every action rides inside it.
    Message,
}

impl Command {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(Command::Message),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Message => "message",
        }
    }
}

/// Fine-grained action tag within a `message` command. Selects the
/// forwarding rule applied per receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specific {
    Search,
    SearchListing,
    CastListing,
    Attach,
    Detach,
    Result,
    Chat,
    Rating,
}

impl Specific {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SEARCH" => Some(Specific::Search),
            "SEARCH_LISTING" => Some(Specific::SearchListing),
            "CAST_LISTING" => Some(Specific::CastListing),
            "ATTACH" => Some(Specific::Attach),
            "DETACH" => Some(Specific::Detach),
            "RESULT" => Some(Specific::Result),
            "CHAT" => Some(Specific::Chat),
            "RATING" => Some(Specific::Rating),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Specific::Search => "SEARCH",
            Specific::SearchListing => "SEARCH_LISTING",
            Specific::CastListing => "CAST_LISTING",
            Specific::Attach => "ATTACH",
            Specific::Detach => "DETACH",
            Specific::Result => "RESULT",
            Specific::Chat => "CHAT",
            Specific::Rating => "RATING",
        }
    }

    /// Whether this action advances `currentSearchDepth` and rewrites the
    /// path map on every hop.
    pub fn is_depth_tracked(self) -> bool {
        matches!(
            self,
            Specific::Search | Specific::SearchListing | Specific::CastListing
        )
    }
}
