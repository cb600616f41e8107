use super::ControlRequest;

pub enum Action {
    Control(ControlRequest),
    Resynchronize(),
}
