use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    ShowWindow,
    ToggleTheme,
    EditMessages,
    Exit,
}

impl TrayAction {
    /// Menu order; a separator goes before `Exit`.
    pub const MENU: [TrayAction; 4] = [
        TrayAction::ShowWindow,
        TrayAction::ToggleTheme,
        TrayAction::EditMessages,
        TrayAction::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TrayAction::ShowWindow => "Show window",
            TrayAction::ToggleTheme => "Toggle theme",
            TrayAction::EditMessages => "Edit messages",
            TrayAction::Exit => "Exit",
        }
    }
}

pub use imp::TrayHandle;

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::{Path, TrayAction};
    use anyhow::{Context, Result};
    use tracing::info;
    use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

    pub struct TrayHandle {
        _icon: TrayIcon,
        items: Vec<(MenuId, TrayAction)>,
    }

    impl TrayHandle {
        /// Must run on the UI thread, after the platform event loop exists.
        pub fn build(icon_path: &Path) -> Result<Self> {
            let image = image::open(icon_path)
                .with_context(|| format!("Failed to open tray icon {}", icon_path.display()))?
                .into_rgba8();
            let (width, height) = image.dimensions();
            let icon = Icon::from_rgba(image.into_raw(), width, height)
                .context("Tray icon has unusable pixel data")?;

            let menu = Menu::new();
            let mut items = Vec::new();
            for action in TrayAction::MENU {
                if action == TrayAction::Exit {
                    menu.append(&PredefinedMenuItem::separator())
                        .context("Failed to build tray menu")?;
                }
                let item = MenuItem::new(action.label(), true, None);
                menu.append(&item).context("Failed to build tray menu")?;
                items.push((item.id().clone(), action));
            }

            let tray = TrayIconBuilder::new()
                .with_menu(Box::new(menu))
                .with_tooltip("Tigan Reminder 🍑")
                .with_icon(icon)
                .build()
                .context("Failed to create tray icon")?;

            info!("tray icon ready");
            Ok(Self { _icon: tray, items })
        }

        /// Next pending menu click, if any.
        pub fn poll(&self) -> Option<TrayAction> {
            while let Ok(event) = MenuEvent::receiver().try_recv() {
                if let Some((_, action)) = self.items.iter().find(|(id, _)| *id == event.id) {
                    return Some(*action);
                }
            }
            None
        }
    }
}

#[cfg(target_os = "linux")]
mod imp {
    use super::{Path, TrayAction};
    use anyhow::{bail, Result};

    pub struct TrayHandle;

    impl TrayHandle {
        pub fn build(icon_path: &Path) -> Result<Self> {
            bail!(
                "system tray needs a GTK main loop, which this build does not run (icon {})",
                icon_path.display()
            )
        }

        pub fn poll(&self) -> Option<TrayAction> {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_ends_with_exit_and_labels_are_unique() {
        assert_eq!(TrayAction::MENU.last(), Some(&TrayAction::Exit));
        let mut labels: Vec<&str> = TrayAction::MENU.iter().map(|a| a.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), TrayAction::MENU.len());
    }
}
