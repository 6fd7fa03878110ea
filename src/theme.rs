//! Theme colors for the case board
//! Optionally read from a kitty.conf style color file (Omarchy ships one at
//! ~/.config/omarchy/current/theme/kitty.conf)

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Cursor, key hints, active borders
    pub case: Color,        // Unopened case body
    pub win: Color,         // Winning case / win dialog
    pub miss: Color,        // Opened miss cases / miss dialog
    pub countdown: Color,   // Suspense countdown
    pub text: Color,
    pub text_dim: Color,
    pub inactive: Color,    // Borders of cases that can't be picked
    pub header: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-ish fallback
        Self {
            accent: Color::Rgb(250, 179, 135),
            case: Color::Rgb(205, 214, 244),
            win: Color::Rgb(166, 218, 149),
            miss: Color::Rgb(243, 139, 168),
            countdown: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(203, 166, 247),
        }
    }
}

impl Theme {
    /// Load from `path`, else the Omarchy theme, else defaults
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(omarchy_theme_path);

        if let Some(path) = path {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    if let Some(theme) = Self::from_kitty_conf(&content) {
                        return theme;
                    }
                    tracing::debug!("No colors found in {}", path.display());
                }
                Err(e) => tracing::debug!("Theme file {} not loaded: {}", path.display(), e),
            }
        }

        Self::default()
    }

    fn from_kitty_conf(content: &str) -> Option<Self> {
        let colors = parse_kitty_conf(content);
        if colors.is_empty() {
            return None;
        }

        let fallback = Self::default();
        let pick = |keys: &[&str], default: Color| {
            keys.iter()
                .find_map(|k| colors.get(*k))
                .copied()
                .unwrap_or(default)
        };

        Some(Self {
            accent: pick(&["color3", "color11"], fallback.accent),
            case: pick(&["foreground"], fallback.case),
            win: pick(&["color2", "color10"], fallback.win),
            miss: pick(&["color1", "color9"], fallback.miss),
            countdown: pick(&["color11", "color3"], fallback.countdown),
            text: pick(&["foreground"], fallback.text),
            text_dim: pick(&["color8"], fallback.text_dim),
            inactive: pick(&["inactive_border_color", "color8"], fallback.inactive),
            header: pick(&["color5", "color13"], fallback.header),
        })
    }
}

fn omarchy_theme_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".config/omarchy/current/theme/kitty.conf"))
}

/// Parse kitty.conf lines of the form `key #hexcolor`
fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once(char::is_whitespace)?;
            Some((key.to_string(), parse_hex_color(value)?))
        })
        .collect()
}

/// Parse #RRGGBB or #RGB
fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(s.get(range)?, 16).ok();

    match s.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Some(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_kitty_conf_mapping() {
        let conf = "# comment\nforeground #bebebe\ncolor1 #D35F5F\ncolor2 #FFC107\nfont_size 11\n";
        let theme = Theme::from_kitty_conf(conf).unwrap();

        assert_eq!(theme.miss, Color::Rgb(211, 95, 95));
        assert_eq!(theme.win, Color::Rgb(255, 193, 7));
        assert_eq!(theme.text, Color::Rgb(190, 190, 190));
        assert_eq!(theme.header, Theme::default().header);
    }

    #[test]
    fn test_empty_conf_falls_back() {
        assert!(Theme::from_kitty_conf("font_size 11\n").is_none());
        let missing = Path::new("/nonexistent/casepick/kitty.conf");
        assert_eq!(Theme::load(Some(missing)).win, Theme::default().win);
    }
}
