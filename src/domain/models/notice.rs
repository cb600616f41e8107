use chrono::DateTime;
use chrono::Local;
use yansi::Paint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
    Alert,
}

/// A transient message for the user.
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: &str) -> Notice {
        return Notice {
            kind,
            text: text.trim().to_string(),
            at: Local::now(),
        };
    }

    pub fn success(text: &str) -> Notice {
        return Notice::new(NoticeKind::Success, text);
    }

    pub fn info(text: &str) -> Notice {
        return Notice::new(NoticeKind::Info, text);
    }

    pub fn alert(text: &str) -> Notice {
        return Notice::new(NoticeKind::Alert, text);
    }

    /// Used by the one-shot CLI commands, which have no UI to render into.
    pub fn print(&self) {
        let line = match self.kind {
            NoticeKind::Success => Paint::green(&self.text).to_string(),
            NoticeKind::Info => Paint::cyan(&self.text).to_string(),
            NoticeKind::Alert => Paint::red(&self.text).to_string(),
        };

        if self.kind == NoticeKind::Alert {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}
