use gpui::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

pub struct Theme {
    pub background: Hsla,
    pub foreground: Hsla,
    pub border: Hsla,
    pub muted_background: Hsla,
    pub muted_foreground: Hsla,
    pub secondary: Hsla,
    pub secondary_foreground: Hsla,
    pub accent: Hsla,
    pub success: Hsla,
    pub danger: Hsla,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: rgb(0xffffff).into(),
            foreground: rgb(0x111827).into(),
            border: rgb(0xe5e7eb).into(),
            muted_background: rgb(0xf3f4f6).into(),
            muted_foreground: rgb(0x6b7280).into(),
            secondary: rgb(0xe5e7eb).into(),
            secondary_foreground: rgb(0x374151).into(),
            accent: rgb(0x2563eb).into(),
            success: rgb(0x059669).into(),
            danger: rgb(0xdc2626).into(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: rgb(0x1f2937).into(),
            foreground: rgb(0xf9fafb).into(),
            border: rgb(0x374151).into(),
            muted_background: rgb(0x374151).into(),
            muted_foreground: rgb(0x9ca3af).into(),
            secondary: rgb(0x4b5563).into(),
            secondary_foreground: rgb(0xe5e7eb).into(),
            accent: rgb(0x3b82f6).into(),
            success: rgb(0x10b981).into(),
            danger: rgb(0xef4444).into(),
        }
    }

    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }
}
