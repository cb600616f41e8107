#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Indicator {
    #[default]
    Neutral,
    Success,
    Failure,
}

impl Indicator {
    pub fn from_success(success: bool) -> Indicator {
        if success {
            return Indicator::Success;
        }

        return Indicator::Failure;
    }
}

/// Output of a compile or a single test, keyed by region id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputRegion {
    pub id: String,
    pub text: String,
    pub indicator: Indicator,
    /// Only tests can be selected for a run.
    pub checked: bool,
}

impl OutputRegion {
    pub const COMPILE: &'static str = "compile";

    pub fn new(id: &str) -> OutputRegion {
        return OutputRegion {
            id: id.to_string(),
            ..OutputRegion::default()
        };
    }

    pub fn is_test(&self) -> bool {
        return self.id != OutputRegion::COMPILE;
    }
}
