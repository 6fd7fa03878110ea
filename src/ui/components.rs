//! Case card widget

use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::{accent, case_color, inactive, miss, text_dim, win};
use crate::game::Reveal;

/// How a single case should be drawn
#[derive(Debug, Clone, Copy)]
pub struct CaseCard {
    pub index: usize,
    pub reveal: Reveal,
    pub under_cursor: bool,
    pub picked: bool,
    pub locked: bool,
}

impl CaseCard {
    pub fn widget(self, height: u16) -> Paragraph<'static> {
        let (face, face_color) = match self.reveal {
            Reveal::Hidden => ("?", case_color()),
            Reveal::Miss => ("✗  MISS", miss()),
            Reveal::Win => ("★  WIN", win()),
        };

        let border_color = if self.picked {
            match self.reveal {
                Reveal::Win => win(),
                Reveal::Miss => miss(),
                Reveal::Hidden => accent(),
            }
        } else if self.under_cursor && !self.locked {
            accent()
        } else if self.locked {
            inactive()
        } else {
            case_color()
        };

        let title_style = if self.under_cursor && !self.locked {
            Style::default().fg(accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(border_color)
        };

        let block = Block::default()
            .title(Span::styled(format!(" Case {} ", self.index + 1), title_style))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(if self.picked { BorderType::Double } else { BorderType::Rounded })
            .border_style(Style::default().fg(border_color));

        // Push the face down to the vertical middle of the card
        let inner = height.saturating_sub(2);
        let pad = usize::from(inner.saturating_sub(2) / 2);
        let mut lines = vec![Line::from(""); pad];
        lines.push(Line::from(Span::styled(
            face,
            Style::default().fg(face_color).add_modifier(Modifier::BOLD),
        )));
        if self.picked {
            lines.push(Line::from(Span::styled("your pick", Style::default().fg(text_dim()))));
        }

        Paragraph::new(lines).block(block).alignment(Alignment::Center)
    }
}
