use tokio::sync::oneshot;
use tui_textarea::Input;

use super::ChannelStatus;
use super::ConfirmPrompt;
use super::Notice;

#[derive(Debug)]
pub enum Event {
    ChannelStatus(ChannelStatus),
    ClockPrime(u64),
    ClockStop(),
    ClockSync(i64, i64),
    ConfirmRequested(ConfirmPrompt, oneshot::Sender<bool>),
    EditorsLocked(),
    Feedback(String, String, bool),
    IndicatorsReset(),
    KeyboardCTRLC(),
    KeyboardInput(Input),
    Notice(Notice),
    OutputsCleared(),
    Reload(),
    UITick(),
}
