use strum::EnumIter;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckMode {
    Auto,
    /// Each delivery is acknowledged on its own once handled.
    ClientIndividual,
}

impl AckMode {
    pub fn header_value(&self) -> &'static str {
        match self {
            AckMode::Auto => return "auto",
            AckMode::ClientIndividual => return "client-individual",
        }
    }
}

/// Topics published by the competition server.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Topic {
    UserControlFeedback,
    ControlFeedback,
    Time,
    Start,
    Stop,
    UserFeedback,
    UserCompileFeedback,
}

impl Topic {
    pub fn destination(&self) -> &'static str {
        match self {
            Topic::UserControlFeedback => return "/user/queue/controlfeedback",
            Topic::ControlFeedback => return "/queue/controlfeedback",
            Topic::Time => return "/queue/time",
            Topic::Start => return "/queue/start",
            Topic::Stop => return "/queue/stop",
            Topic::UserFeedback => return "/user/queue/feedback",
            Topic::UserCompileFeedback => return "/user/queue/compilefeedback",
        }
    }

    pub fn ack_mode(&self) -> AckMode {
        match self {
            Topic::UserFeedback | Topic::UserCompileFeedback => return AckMode::Auto,
            _ => return AckMode::ClientIndividual,
        }
    }

    pub fn from_destination(destination: &str) -> Option<Topic> {
        return Topic::iter().find(|e| return e.destination() == destination);
    }
}
