use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// `None` leaves the background untouched.
    pub paper: Option<Color>,
    pub ink: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

impl Palette {
    pub fn classic() -> Self {
        Self {
            paper: Some(Color::WHITE),
            ink: Color::BLACK,
        }
    }

    pub fn transparent() -> Self {
        Self {
            paper: None,
            ink: Color::BLACK,
        }
    }

    pub fn inverted() -> Self {
        Self {
            paper: Some(Color::BLACK),
            ink: Color::WHITE,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "transparent" => Some(Self::transparent()),
            "inverted" => Some(Self::inverted()),
            _ => None,
        }
    }
}
