use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

use super::ControlAction;

pub struct TextArea {}

impl<'a> TextArea {
    /// Single line input asking for the argument of an action.
    pub fn for_action(action: ControlAction) -> tui_textarea::TextArea<'a> {
        let title = match action {
            ControlAction::CompetitionCreateNew => "New competition name (name|year)",
            ControlAction::CompetitionDelete => "Id of the competition to delete",
            _ => "Value",
        };

        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title(title)
                .padding(Padding::new(1, 1, 0, 0)),
        );

        return textarea;
    }
}
