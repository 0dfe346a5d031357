pub use gamehost_core::{
    AddressReading, AddressStability, Instance, InstanceState, NetworkInterface, PublicAddress,
};

/// Chat destination a reply is delivered to (a channel id on the gateway)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyDestination(pub u64);

impl std::fmt::Display for ReplyDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat message as seen by the router, already stripped of gateway detail
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_is_self: bool,
    pub content: String,
    pub channel: ReplyDestination,
    pub channel_name: String,
    /// Name of the grouping (category) the channel lives in, if any
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKeyword {
    Start,
    Stop,
    Ip,
    Unrecognized(String),
}

impl CommandKeyword {
    /// Keywords are case-sensitive.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "ip" => Self::Ip,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// One command, alive only while its message is being handled
#[derive(Debug, Clone)]
pub struct Command {
    pub instance_name: String,
    pub keyword: CommandKeyword,
    pub destination: ReplyDestination,
}
