use bevy_app::{App, PreUpdate};
use bevy_camera::visibility::Visibility;
use bevy_color::{Color, palettes::tailwind};
#[cfg(feature = "bevy_reflect")]
use bevy_ecs::reflect::{ReflectComponent, ReflectResource};
use bevy_ecs::{
    component::Component,
    entity::Entity,
    hierarchy::ChildOf,
    message::{Message, MessageWriter},
    name::Name,
    query::Changed,
    resource::Resource,
    schedule::IntoScheduleConfigs as _,
    system::{Query, Res, ResMut},
    world::World,
};
use bevy_text::{TextColor, TextFont};
use bevy_time::Time;
use bevy_ui::{
    AlignItems, BackgroundColor, BorderRadius, FlexDirection, FocusPolicy, GlobalZIndex,
    Interaction, JustifyContent, Node, PositionType, UiRect, Val, widget::Text,
};
use tiny_bail::prelude::*;

use crate::CatalogUiSystems;

/// Spawns the install confirmation dialog and adds the install flow systems.
pub fn plugin(app: &mut App) {
    #[cfg(feature = "bevy_reflect")]
    {
        app.register_type::<InstallButton>();
        app.register_type::<InstallDialog>();
        app.register_type::<LaunchInstall>();
    }

    let dialog = InstallDialog::new(app.world_mut());
    app.insert_resource(dialog);
    app.init_resource::<DialogState>();

    app.add_message::<LaunchInstall>();
    app.add_systems(
        PreUpdate,
        (open_dialog, confirm_install, cancel_dialog, tick_pending)
            .chain()
            .in_set(CatalogUiSystems::Behavior),
    );
}

/// The install action of a catalog entry.
///
/// Put this on the entry's button; pressing it opens the confirmation dialog
/// for this entry. Both fields are taken as-is: an empty name produces a
/// dialog titled "Instalar " and an empty link is delivered verbatim on
/// confirmation.
#[derive(Component, Clone, Debug)]
#[require(Interaction)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub struct InstallButton {
    /// The entry's display name.
    pub software: String,
    /// The entry's install link.
    pub install_url: String,
}

impl InstallButton {
    /// An install button for the given entry.
    pub fn new(software: impl Into<String>, install_url: impl Into<String>) -> Self {
        Self {
            software: software.into(),
            install_url: install_url.into(),
        }
    }
}

/// A message written when a confirmed install is ready to proceed.
///
/// The crate does not navigate anywhere itself; read this message and open
/// [`Self::install_url`] however your application navigates (OS browser,
/// embedded view, download queue).
#[derive(Message, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct LaunchInstall {
    /// The display name the dialog was confirmed for.
    pub software: String,
    /// The install link, exactly as configured on the [`InstallButton`].
    pub install_url: String,
}

/// The delay between confirming an install and [`LaunchInstall`] being
/// written (in milliseconds). The confirm button shows [`BUSY_LABEL`] while
/// it runs; the dialog cannot be dismissed during this window.
pub const INSTALL_DELAY: u16 = 1500;

/// The confirm button's resting label.
pub const CONFIRM_LABEL: &str = "Instalar";

/// The confirm button's label while an install is pending.
pub const BUSY_LABEL: &str = "Instalando...";

/// A [`Resource`] holding the entities of the install confirmation dialog.
///
/// The plugin spawns a default hidden dialog; applications may restyle these
/// entities freely. The dialog systems assume all of them exist and warn if
/// one is gone.
#[derive(Resource, Copy, Clone, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Resource)
)]
pub struct InstallDialog {
    /// The full-screen scrim. Shown/hidden to open/close the dialog;
    /// pressing it cancels.
    pub root: Entity,
    /// The dialog panel.
    pub panel: Entity,
    /// The title text node.
    pub title: Entity,
    /// The confirm button.
    pub confirm: Entity,
    /// The confirm button's label text node.
    pub confirm_label: Entity,
    /// The cancel button.
    pub cancel: Entity,
}

impl InstallDialog {
    fn new(world: &mut World) -> Self {
        let root = world
            .spawn((
                Name::new("InstallDialog"),
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..Default::default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
                FocusPolicy::Block,
                Interaction::None,
                Visibility::Hidden,
                GlobalZIndex(998),
            ))
            .id();

        let panel = world
            .spawn((
                Name::new("Panel"),
                Node {
                    min_width: Val::Px(320.0),
                    max_width: Val::Vw(80.0),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(12.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    ..Default::default()
                },
                BackgroundColor(tailwind::GRAY_800.into()),
                BorderRadius::all(Val::Px(6.0)),
                // Swallows clicks so they do not land on the scrim.
                Interaction::None,
                ChildOf(root),
            ))
            .id();

        let title = world
            .spawn((
                Name::new("Title"),
                Text::default(),
                TextFont::from_font_size(18.0),
                TextColor(Color::WHITE),
                ChildOf(panel),
            ))
            .id();

        world.spawn((
            Name::new("Prompt"),
            Text::new("Tem certeza de que deseja instalar este software?"),
            TextFont::from_font_size(14.0),
            TextColor(tailwind::GRAY_300.into()),
            ChildOf(panel),
        ));

        let buttons = world
            .spawn((
                Name::new("Buttons"),
                Node {
                    justify_content: JustifyContent::FlexEnd,
                    column_gap: Val::Px(8.0),
                    ..Default::default()
                },
                ChildOf(panel),
            ))
            .id();

        let cancel = world
            .spawn((
                Name::new("Cancelar"),
                Node {
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                    ..Default::default()
                },
                BackgroundColor(tailwind::GRAY_600.into()),
                BorderRadius::all(Val::Px(4.0)),
                Interaction::None,
                ChildOf(buttons),
            ))
            .id();

        world.spawn((
            Text::new("Cancelar"),
            TextFont::from_font_size(14.0),
            TextColor(Color::WHITE),
            ChildOf(cancel),
        ));

        let confirm = world
            .spawn((
                Name::new("Confirmar"),
                Node {
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                    ..Default::default()
                },
                BackgroundColor(tailwind::BLUE_600.into()),
                BorderRadius::all(Val::Px(4.0)),
                Interaction::None,
                ChildOf(buttons),
            ))
            .id();

        let confirm_label = world
            .spawn((
                Text::new(CONFIRM_LABEL),
                TextFont::from_font_size(14.0),
                TextColor(Color::WHITE),
                ChildOf(confirm),
            ))
            .id();

        Self {
            root,
            panel,
            title,
            confirm,
            confirm_label,
            cancel,
        }
    }
}

/// Internal dialog state: which entry the dialog is armed for, and the
/// remaining install delay once confirmed.
#[derive(Resource, Default, Debug)]
struct DialogState {
    armed: Option<InstallButton>,
    pending_ms: Option<u16>,
}

fn open_dialog(
    mut state: ResMut<DialogState>,
    dialog: Res<InstallDialog>,
    button_query: Query<(&InstallButton, &Interaction), Changed<Interaction>>,
    mut text_query: Query<&mut Text>,
    mut visibility_query: Query<&mut Visibility>,
) {
    // The pending window is not cancellable, and keeps the dialog locked.
    rq!(state.pending_ms.is_none());

    let mut opened = None;
    for (button, interaction) in &button_query {
        if matches!(interaction, Interaction::Pressed) {
            // Last click wins, as with repeated clicks on the page.
            opened = Some(button.clone());
        }
    }
    let button = rq!(opened);

    r!(text_query.get_mut(dialog.title)).0 = format!("Instalar {}", button.software);
    r!(text_query.get_mut(dialog.confirm_label)).0 = CONFIRM_LABEL.to_string();
    state.armed = Some(button);
    *r!(visibility_query.get_mut(dialog.root)) = Visibility::Visible;
}

fn confirm_install(
    mut state: ResMut<DialogState>,
    dialog: Res<InstallDialog>,
    interaction_query: Query<&Interaction, Changed<Interaction>>,
    mut text_query: Query<&mut Text>,
) {
    rq!(state.armed.is_some() && state.pending_ms.is_none());
    let interaction = rq!(interaction_query.get(dialog.confirm));
    rq!(matches!(interaction, Interaction::Pressed));

    r!(text_query.get_mut(dialog.confirm_label)).0 = BUSY_LABEL.to_string();
    state.pending_ms = Some(INSTALL_DELAY);
}

fn cancel_dialog(
    mut state: ResMut<DialogState>,
    dialog: Res<InstallDialog>,
    interaction_query: Query<&Interaction, Changed<Interaction>>,
    mut visibility_query: Query<&mut Visibility>,
) {
    rq!(state.armed.is_some() && state.pending_ms.is_none());
    let pressed = [dialog.cancel, dialog.root].iter().any(|&entity| {
        interaction_query
            .get(entity)
            .is_ok_and(|interaction| matches!(interaction, Interaction::Pressed))
    });
    rq!(pressed);

    state.armed = None;
    *r!(visibility_query.get_mut(dialog.root)) = Visibility::Hidden;
}

fn tick_pending(
    mut state: ResMut<DialogState>,
    dialog: Res<InstallDialog>,
    time: Res<Time>,
    mut launch_install: MessageWriter<LaunchInstall>,
    mut text_query: Query<&mut Text>,
    mut visibility_query: Query<&mut Visibility>,
) {
    let remaining = rq!(state.pending_ms);
    let remaining = remaining.saturating_sub(time.delta().as_millis() as u16);
    if remaining > 0 {
        state.pending_ms = Some(remaining);
        return;
    }

    state.pending_ms = None;
    let armed = r!(state.armed.take());
    launch_install.write(LaunchInstall {
        software: armed.software,
        install_url: armed.install_url,
    });

    r!(text_query.get_mut(dialog.confirm_label)).0 = CONFIRM_LABEL.to_string();
    *r!(visibility_query.get_mut(dialog.root)) = Visibility::Hidden;
}

#[cfg(test)]
mod tests {
    use bevy_app::{App, Update};
    use bevy_ecs::message::MessageReader;
    use core::time::Duration;

    use super::*;

    #[derive(Resource, Default)]
    struct Launched(Vec<LaunchInstall>);

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.init_resource::<Launched>();
        app.add_plugins(plugin);
        app.add_systems(
            Update,
            |mut reader: MessageReader<LaunchInstall>, mut launched: ResMut<Launched>| {
                launched.0.extend(reader.read().cloned());
            },
        );
        app
    }

    fn advance(app: &mut App, ms: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(ms));
        app.update();
    }

    fn press(app: &mut App, entity: Entity) {
        // `Time::advance_by` leaves its delta in place, so zero it out to
        // keep the press itself from consuming pending time.
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::ZERO);
        app.world_mut().entity_mut(entity).insert(Interaction::Pressed);
        app.update();
        app.world_mut().entity_mut(entity).insert(Interaction::None);
    }

    fn dialog(app: &App) -> InstallDialog {
        *app.world().resource::<InstallDialog>()
    }

    fn title_text(app: &App) -> String {
        app.world().get::<Text>(dialog(app).title).unwrap().0.clone()
    }

    fn confirm_text(app: &App) -> String {
        app.world()
            .get::<Text>(dialog(app).confirm_label)
            .unwrap()
            .0
            .clone()
    }

    fn root_visibility(app: &App) -> Visibility {
        *app.world().get::<Visibility>(dialog(app).root).unwrap()
    }

    #[test]
    fn pressing_install_button_populates_and_opens_dialog() {
        let mut app = app();
        let button = app
            .world_mut()
            .spawn(InstallButton::new("GIMP", "https://example.com/gimp"))
            .id();

        app.update();
        assert_eq!(root_visibility(&app), Visibility::Hidden);

        press(&mut app, button);
        assert_eq!(title_text(&app), "Instalar GIMP");
        assert_eq!(root_visibility(&app), Visibility::Visible);
    }

    #[test]
    fn confirming_launches_exactly_the_configured_url_after_delay() {
        let mut app = app();
        let button = app
            .world_mut()
            .spawn(InstallButton::new("GIMP", "https://example.com/gimp"))
            .id();
        press(&mut app, button);

        let confirm = dialog(&app).confirm;
        press(&mut app, confirm);
        assert_eq!(confirm_text(&app), BUSY_LABEL);
        assert!(app.world().resource::<Launched>().0.is_empty());

        // One tick short of the delay: still pending.
        advance(&mut app, u64::from(INSTALL_DELAY) - 1);
        assert!(app.world().resource::<Launched>().0.is_empty());

        advance(&mut app, 1);
        let launched = &app.world().resource::<Launched>().0;
        assert_eq!(
            launched.as_slice(),
            [LaunchInstall {
                software: "GIMP".to_string(),
                install_url: "https://example.com/gimp".to_string(),
            }]
        );
        assert_eq!(root_visibility(&app), Visibility::Hidden);
        assert_eq!(confirm_text(&app), CONFIRM_LABEL);
    }

    #[test]
    fn cancel_closes_without_launching() {
        let mut app = app();
        let button = app
            .world_mut()
            .spawn(InstallButton::new("GIMP", "https://example.com/gimp"))
            .id();
        press(&mut app, button);

        let cancel = dialog(&app).cancel;
        press(&mut app, cancel);
        assert_eq!(root_visibility(&app), Visibility::Hidden);

        advance(&mut app, u64::from(INSTALL_DELAY));
        assert!(app.world().resource::<Launched>().0.is_empty());
    }

    #[test]
    fn pending_install_ignores_cancel_and_reopen() {
        let mut app = app();
        let button = app
            .world_mut()
            .spawn(InstallButton::new("GIMP", "https://example.com/gimp"))
            .id();
        press(&mut app, button);
        let confirm = dialog(&app).confirm;
        press(&mut app, confirm);

        // Mid-delay, neither cancel nor another entry click does anything.
        advance(&mut app, 500);
        let cancel = dialog(&app).cancel;
        press(&mut app, cancel);
        assert_eq!(root_visibility(&app), Visibility::Visible);
        press(&mut app, button);
        assert_eq!(confirm_text(&app), BUSY_LABEL);

        advance(&mut app, u64::from(INSTALL_DELAY));
        assert_eq!(app.world().resource::<Launched>().0.len(), 1);
    }

    #[test]
    fn reopening_for_another_entry_repopulates() {
        let mut app = app();
        let first = app
            .world_mut()
            .spawn(InstallButton::new("GIMP", "https://example.com/gimp"))
            .id();
        let second = app
            .world_mut()
            .spawn(InstallButton::new("Blender", "https://example.com/blender"))
            .id();

        press(&mut app, first);
        assert_eq!(title_text(&app), "Instalar GIMP");
        press(&mut app, second);
        assert_eq!(title_text(&app), "Instalar Blender");

        let confirm = dialog(&app).confirm;
        press(&mut app, confirm);
        advance(&mut app, u64::from(INSTALL_DELAY));
        let launched = &app.world().resource::<Launched>().0;
        assert_eq!(launched[0].install_url, "https://example.com/blender");
    }

    #[test]
    fn empty_fields_open_an_inert_dialog() {
        let mut app = app();
        let button = app.world_mut().spawn(InstallButton::new("", "")).id();
        press(&mut app, button);
        assert_eq!(title_text(&app), "Instalar ");

        let confirm = dialog(&app).confirm;
        press(&mut app, confirm);
        advance(&mut app, u64::from(INSTALL_DELAY));
        let launched = &app.world().resource::<Launched>().0;
        assert_eq!(launched[0].install_url, "");
    }
}
