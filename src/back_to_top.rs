use bevy_app::{App, PreUpdate};
use bevy_camera::visibility::Visibility;
#[cfg(feature = "bevy_reflect")]
use bevy_ecs::reflect::ReflectComponent;
use bevy_ecs::{
    change_detection::DetectChangesMut as _,
    component::Component,
    entity::Entity,
    query::{Changed, With},
    schedule::IntoScheduleConfigs as _,
    system::{Commands, Query, Res},
};
use bevy_math::ops;
use bevy_time::Time;
use bevy_ui::{Interaction, ScrollPosition};
use tiny_bail::prelude::*;

use crate::CatalogUiSystems;

/// Adds the back-to-top visibility and smooth scroll systems.
pub fn plugin(app: &mut App) {
    #[cfg(feature = "bevy_reflect")]
    {
        app.register_type::<BackToTop>();
        app.register_type::<ScrollToTop>();
    }

    app.add_systems(
        PreUpdate,
        (toggle_button, start_scroll, scroll_to_top)
            .chain()
            .in_set(CatalogUiSystems::Behavior),
    );
}

/// A button that scrolls a container back to the top.
///
/// The button stays hidden until [`Self::area`] has scrolled past
/// [`SHOW_THRESHOLD`]; pressing it smoothly scrolls the container back to
/// offset zero. If the area entity is missing, the button does nothing.
#[derive(Component, Copy, Clone, Debug)]
#[require(Interaction, Visibility)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub struct BackToTop {
    /// The scrollable container this button returns to the top.
    pub area: Entity,
}

/// The vertical scroll offset (in logical pixels) past which a [`BackToTop`]
/// button becomes visible.
pub const SHOW_THRESHOLD: f32 = 300.0;

/// The exponential decay rate of the smooth scroll, per second. A full
/// viewport of scroll settles in about half a second.
const SMOOTH_SCROLL_RATE: f32 = 15.0;

/// Marks a container that is currently animating back to the top.
#[derive(Component, Copy, Clone, Default, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub(crate) struct ScrollToTop;

fn toggle_button(
    mut button_query: Query<(&BackToTop, &mut Visibility)>,
    scroll_query: Query<&ScrollPosition>,
) {
    for (button, mut visibility) in &mut button_query {
        let scroll = cq!(scroll_query.get(button.area));
        let shown = scroll.0.y > SHOW_THRESHOLD;
        visibility.set_if_neq(if shown {
            Visibility::Visible
        } else {
            Visibility::Hidden
        });
    }
}

fn start_scroll(
    mut commands: Commands,
    button_query: Query<(&BackToTop, &Interaction), Changed<Interaction>>,
) {
    for (button, interaction) in &button_query {
        cq!(matches!(interaction, Interaction::Pressed));
        cq!(commands.get_entity(button.area)).insert(ScrollToTop);
    }
}

fn scroll_to_top(
    mut commands: Commands,
    time: Res<Time>,
    mut area_query: Query<(Entity, &mut ScrollPosition), With<ScrollToTop>>,
) {
    for (entity, mut scroll) in &mut area_query {
        scroll.0.y *= ops::exp(-SMOOTH_SCROLL_RATE * time.delta_secs());
        if scroll.0.y.abs() < 0.5 {
            scroll.0.y = 0.0;
            commands.entity(entity).remove::<ScrollToTop>();
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_app::App;
    use bevy_math::Vec2;
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

    #[test]
    fn button_appears_past_the_threshold() {
        let mut app = app();
        let area = app
            .world_mut()
            .spawn(ScrollPosition(Vec2::new(0.0, 400.0)))
            .id();
        let button = app.world_mut().spawn(BackToTop { area }).id();

        app.update();
        assert_eq!(
            *app.world().get::<Visibility>(button).unwrap(),
            Visibility::Visible,
        );

        app.world_mut()
            .entity_mut(area)
            .insert(ScrollPosition(Vec2::new(0.0, 100.0)));
        app.update();
        assert_eq!(
            *app.world().get::<Visibility>(button).unwrap(),
            Visibility::Hidden,
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut app = app();
        let area = app
            .world_mut()
            .spawn(ScrollPosition(Vec2::new(0.0, SHOW_THRESHOLD)))
            .id();
        let button = app.world_mut().spawn(BackToTop { area }).id();

        app.update();
        assert_eq!(
            *app.world().get::<Visibility>(button).unwrap(),
            Visibility::Hidden,
        );
    }

    #[test]
    fn pressing_scrolls_back_to_exactly_zero() {
        let mut app = app();
        let area = app
            .world_mut()
            .spawn(ScrollPosition(Vec2::new(0.0, 1200.0)))
            .id();
        let button = app.world_mut().spawn(BackToTop { area }).id();

        app.world_mut()
            .entity_mut(button)
            .insert(Interaction::Pressed);
        app.update();

        // A second of 16 ms frames is plenty for the ease-out to settle.
        for _ in 0..60 {
            advance(&mut app, 16);
        }
        let scroll = app.world().get::<ScrollPosition>(area).unwrap();
        assert_eq!(scroll.0.y, 0.0);
        assert!(app.world().get::<ScrollToTop>(area).is_none());
    }

    #[test]
    fn missing_area_is_a_no_op() {
        let mut app = app();
        let area = app.world_mut().spawn_empty().id();
        let button = app.world_mut().spawn(BackToTop { area }).id();
        app.world_mut().entity_mut(area).despawn();

        app.world_mut()
            .entity_mut(button)
            .insert(Interaction::Pressed);
        app.update();
        advance(&mut app, 16);
    }
}
