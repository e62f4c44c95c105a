use bevy_app::{App, PreUpdate};
use bevy_color::{Alpha as _, Color, palettes::tailwind};
#[cfg(feature = "bevy_reflect")]
use bevy_ecs::reflect::ReflectComponent;
use bevy_ecs::{
    component::Component,
    entity::Entity,
    hierarchy::ChildOf,
    message::{Message, MessageReader},
    name::Name,
    query::{Changed, With},
    schedule::IntoScheduleConfigs as _,
    system::{Commands, Query, Res},
};
use bevy_text::{TextColor, TextFont};
use bevy_time::Time;
use bevy_ui::{
    AlignItems, BackgroundColor, BorderRadius, Interaction, JustifyContent, Node, UiRect, Val,
    widget::Text,
};
use tiny_bail::prelude::*;

use crate::CatalogUiSystems;

/// Adds the notification banner systems.
pub fn plugin(app: &mut App) {
    #[cfg(feature = "bevy_reflect")]
    {
        app.register_type::<NotificationArea>();
        app.register_type::<Notify>();
        app.register_type::<Severity>();
        app.register_type::<Banner>();
    }

    app.add_message::<Notify>();
    app.add_systems(
        PreUpdate,
        (spawn_banners, age_banners, dismiss_banners)
            .chain()
            .in_set(CatalogUiSystems::Behavior),
    );
}

/// Marks the container that receives notification banners.
///
/// If no entity carries this marker when a [`Notify`] message arrives, the
/// message is dropped without effect.
#[derive(Component, Copy, Clone, Default, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub struct NotificationArea;

/// A message requesting a transient notification banner.
///
/// Each message spawns one independent banner; there is no queue, so
/// concurrent messages stack in the [`NotificationArea`].
#[derive(Message, Clone, Debug)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct Notify {
    /// The message shown in the banner.
    pub text: String,
    /// The banner's severity, which picks its color.
    pub severity: Severity,
}

impl Notify {
    /// A success notification with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::default(),
        }
    }

    /// Set the banner's severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// The severity of a notification banner.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub enum Severity {
    /// A completed action.
    #[default]
    Success,
    /// A failed action.
    Danger,
    /// Something that needs attention but did not fail.
    Warning,
    /// Neutral information.
    Info,
}

impl Severity {
    fn color(self) -> Color {
        match self {
            Self::Success => tailwind::GREEN_600.into(),
            Self::Danger => tailwind::RED_600.into(),
            Self::Warning => tailwind::AMBER_500.into(),
            Self::Info => tailwind::SKY_500.into(),
        }
    }
}

/// How long a banner stays fully visible (in milliseconds).
pub const BANNER_LINGER: u16 = 5000;

/// How long a banner takes to fade out before it is removed (in
/// milliseconds).
pub const BANNER_FADE: u16 = 150;

/// A live notification banner.
#[derive(Component, Clone, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub(crate) struct Banner {
    /// The remaining fully-visible duration (in milliseconds).
    linger_ms: u16,
    /// The remaining fade-out duration once the linger has elapsed.
    fade_ms: u16,
    /// The base background color the fade interpolates from.
    color: Color,
}

/// The dismiss control inside a banner.
#[derive(Component, Copy, Clone, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub(crate) struct DismissBanner {
    banner: Entity,
}

fn spawn_banners(
    mut commands: Commands,
    mut notify: MessageReader<Notify>,
    area_query: Query<Entity, With<NotificationArea>>,
) {
    for message in notify.read() {
        let area = cq!(area_query.single());
        let color = message.severity.color();

        let banner = commands
            .spawn((
                Name::new("Notification"),
                Node {
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::SpaceBetween,
                    column_gap: Val::Px(12.0),
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                    ..Default::default()
                },
                BackgroundColor(color),
                BorderRadius::all(Val::Px(4.0)),
                Banner {
                    linger_ms: BANNER_LINGER,
                    fade_ms: BANNER_FADE,
                    color,
                },
                ChildOf(area),
            ))
            .id();

        commands.spawn((
            Text::new(message.text.clone()),
            TextFont::from_font_size(14.0),
            TextColor(Color::WHITE),
            ChildOf(banner),
        ));

        commands.spawn((
            Name::new("Fechar"),
            DismissBanner { banner },
            Interaction::None,
            Text::new("×"),
            TextFont::from_font_size(14.0),
            TextColor(Color::WHITE),
            ChildOf(banner),
        ));
    }
}

fn age_banners(
    mut commands: Commands,
    time: Res<Time>,
    mut banner_query: Query<(Entity, &mut Banner, &mut BackgroundColor)>,
) {
    let delta = time.delta().as_millis() as u16;
    for (entity, mut banner, mut background) in &mut banner_query {
        if banner.linger_ms > 0 {
            banner.linger_ms = banner.linger_ms.saturating_sub(delta);
            continue;
        }

        banner.fade_ms = banner.fade_ms.saturating_sub(delta);
        if banner.fade_ms == 0 {
            commands.entity(entity).despawn();
            continue;
        }
        let alpha = f32::from(banner.fade_ms) / f32::from(BANNER_FADE);
        background.0 = banner.color.with_alpha(alpha);
    }
}

fn dismiss_banners(
    mut commands: Commands,
    dismiss_query: Query<(&DismissBanner, &Interaction), Changed<Interaction>>,
) {
    for (dismiss, interaction) in &dismiss_query {
        cq!(matches!(interaction, Interaction::Pressed));
        cq!(commands.get_entity(dismiss.banner)).despawn();
    }
}

#[cfg(test)]
mod tests {
    use bevy_app::App;
    use bevy_color::Alpha as _;
    use core::time::Duration;

    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_plugins(plugin);
        app
    }

    fn advance(app: &mut App, ms: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(ms));
        app.update();
    }

    fn banner_count(app: &mut App) -> usize {
        let world = app.world_mut();
        let mut query = world.query::<&Banner>();
        query.iter(world).count()
    }

    #[test]
    fn notify_spawns_one_banner_and_expires_it() {
        let mut app = app();
        app.world_mut().spawn(NotificationArea);
        app.world_mut().write_message(Notify::new("Instalado"));

        app.update();
        assert_eq!(banner_count(&mut app), 1);

        // Fully visible right up to the linger deadline.
        advance(&mut app, u64::from(BANNER_LINGER));
        assert_eq!(banner_count(&mut app), 1);

        // Gone once the fade has run its course.
        advance(&mut app, u64::from(BANNER_FADE));
        assert_eq!(banner_count(&mut app), 0);
    }

    #[test]
    fn fade_drops_the_background_alpha() {
        let mut app = app();
        app.world_mut().spawn(NotificationArea);
        app.world_mut()
            .write_message(Notify::new("Falhou").with_severity(Severity::Danger));
        app.update();

        advance(&mut app, u64::from(BANNER_LINGER));
        advance(&mut app, u64::from(BANNER_FADE) / 2);

        let world = app.world_mut();
        let mut query = world.query::<(&Banner, &BackgroundColor)>();
        let (_, background) = query.single(world).unwrap();
        assert!(background.0.alpha() < 1.0);
    }

    #[test]
    fn no_area_means_no_banner() {
        let mut app = app();
        app.world_mut().write_message(Notify::new("Instalado"));
        app.update();
        assert_eq!(banner_count(&mut app), 0);
    }

    #[test]
    fn concurrent_notifications_stack() {
        let mut app = app();
        app.world_mut().spawn(NotificationArea);
        app.world_mut().write_message(Notify::new("um"));
        app.world_mut()
            .write_message(Notify::new("dois").with_severity(Severity::Info));
        app.update();
        assert_eq!(banner_count(&mut app), 2);
    }

    #[test]
    fn dismiss_removes_the_banner_immediately() {
        let mut app = app();
        app.world_mut().spawn(NotificationArea);
        app.world_mut().write_message(Notify::new("Instalado"));
        app.update();

        let dismiss = {
            let world = app.world_mut();
            let mut query = world.query::<(Entity, &DismissBanner)>();
            query.single(world).unwrap().0
        };
        app.world_mut()
            .entity_mut(dismiss)
            .insert(Interaction::Pressed);
        app.update();
        assert_eq!(banner_count(&mut app), 0);
    }
}
