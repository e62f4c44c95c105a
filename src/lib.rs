//! Interactive behaviors for a software catalog page built with `bevy_ui`:
//! hover tooltips on catalog entries, an install confirmation dialog, a
//! back-to-top button for the catalog scroll area, and transient notification
//! banners.
//!
//! Add [`CatalogUiPlugin`] to your app, then tag your own UI entities with
//! [`Tooltip`], [`InstallButton`], [`BackToTop`], or [`NotificationArea`].
//! The plugin spawns and drives the shared widgets (the primary tooltip and
//! the install dialog) itself.

/// Re-exports of the most commonly used types.
pub mod prelude {
    pub use super::{
        BackToTop, CatalogUiPlugin, CatalogUiSystems, InstallButton, InstallDialog, LaunchInstall,
        NotificationArea, Notify, Severity, Tooltip, TooltipPlugin, TooltipSettings, TooltipSide,
    };
}

/// The back-to-top button for the catalog scroll area.
pub mod back_to_top;
/// Install buttons and the install confirmation dialog.
pub mod install;
/// Transient notification banners.
pub mod notify;
/// Hover tooltips for catalog entries.
pub mod tooltip;

pub use back_to_top::BackToTop;
pub use install::{InstallButton, InstallDialog, LaunchInstall};
pub use notify::{NotificationArea, Notify, Severity};
pub use tooltip::{Tooltip, TooltipPlugin, TooltipSettings, TooltipSide};

use bevy_app::{App, Plugin, PostUpdate, PreUpdate};
use bevy_ecs::{
    entity::Entity,
    schedule::{IntoScheduleConfigs as _, SystemSet},
};
use bevy_ui::UiSystems;

/// Adds every catalog page behavior to the [`App`].
///
/// Equivalent to adding [`TooltipPlugin`], [`install::plugin`],
/// [`back_to_top::plugin`], and [`notify::plugin`] individually, plus the
/// [`CatalogUiSystems`] ordering against `bevy_ui`'s focus and layout passes.
#[derive(Default)]
pub struct CatalogUiPlugin {
    /// Set a custom entity for [`TooltipSettings::container`], or spawn a default entity if `None`.
    pub tooltip_container: Option<Entity>,
    /// Set a custom entity for [`TooltipSettings::text`], or spawn a default entity if `None`.
    pub tooltip_text: Option<Entity>,
}

impl Plugin for CatalogUiPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(PreUpdate, CatalogUiSystems::Behavior.after(UiSystems::Focus));
        app.configure_sets(
            PostUpdate,
            CatalogUiSystems::Placement.after(UiSystems::Layout),
        );
        app.add_plugins((
            TooltipPlugin {
                container: self.tooltip_container,
                text: self.tooltip_text,
            },
            install::plugin,
            back_to_top::plugin,
            notify::plugin,
        ));
    }
}

/// System sets for all catalog page behaviors.
#[derive(SystemSet, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CatalogUiSystems {
    /// Interaction-driven state updates, in [`PreUpdate`] after `bevy_ui` has
    /// refreshed [`bevy_ui::Interaction`].
    Behavior,
    /// Tooltip placement, in [`PostUpdate`] after UI layout.
    Placement,
}
