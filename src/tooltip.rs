use bevy_app::{App, Plugin, PostUpdate, PreUpdate};
use bevy_camera::visibility::Visibility;
use bevy_color::Color;
#[cfg(feature = "bevy_reflect")]
use bevy_ecs::reflect::{ReflectComponent, ReflectResource};
use bevy_ecs::{
    component::Component,
    entity::Entity,
    hierarchy::ChildOf,
    message::{Message, MessageReader, MessageWriter},
    name::Name,
    query::With,
    resource::Resource,
    schedule::{IntoScheduleConfigs as _, common_conditions::on_message},
    system::{Query, Res, ResMut},
    world::World,
};
use bevy_math::{Rect, Vec2};
use bevy_text::{TextColor, TextFont};
use bevy_time::Time;
use bevy_transform::{
    components::{GlobalTransform, Transform},
    systems::{mark_dirty_trees, propagate_parent_transforms, sync_simple_transforms},
};
use bevy_ui::{
    BackgroundColor, BorderRadius, ComputedNode, GlobalZIndex, Interaction, Node, PositionType,
    UiRect, Val, widget::Text,
};
use bevy_window::{PrimaryWindow, Window};
use tiny_bail::prelude::*;

use crate::CatalogUiSystems;

/// Hover tooltips for catalog entries.
///
/// Spawns the primary tooltip widget (a hidden container node with a text
/// child) and shows it over whichever [`Tooltip`] entity is hovered.
#[derive(Default)]
pub struct TooltipPlugin {
    /// Set a custom entity for [`TooltipSettings::container`], or spawn a default entity if `None`.
    pub container: Option<Entity>,
    /// Set a custom entity for [`TooltipSettings::text`], or spawn a default entity if `None`.
    pub text: Option<Entity>,
}

impl Plugin for TooltipPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(feature = "bevy_reflect")]
        {
            app.register_type::<Tooltip>();
            app.register_type::<TooltipSettings>();
            app.register_type::<HoverState>();
        }

        let settings = TooltipSettings::new(app.world_mut(), self.container, self.text);
        app.insert_resource(settings);
        app.init_resource::<HoverState>();

        app.add_message::<HideTooltip>();
        app.add_message::<ShowTooltip>();
        app.add_systems(
            PreUpdate,
            (
                update_hover_state,
                hide_tooltip.run_if(on_message::<HideTooltip>),
                show_tooltip.run_if(on_message::<ShowTooltip>),
            )
                .chain()
                .in_set(CatalogUiSystems::Behavior),
        );
        app.add_systems(
            PostUpdate,
            (
                place_tooltip,
                mark_dirty_trees,
                propagate_parent_transforms,
                sync_simple_transforms,
            )
                .chain()
                .in_set(CatalogUiSystems::Placement),
        );
    }
}

/// A [`Resource`] holding the entities of the primary tooltip widget.
#[derive(Resource, Copy, Clone, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Resource)
)]
pub struct TooltipSettings {
    /// The UI node shown as the tooltip.
    pub container: Entity,
    /// The text node inside [`Self::container`].
    pub text: Entity,
}

impl TooltipSettings {
    fn new(world: &mut World, container: Option<Entity>, text: Option<Entity>) -> Self {
        let container = container.unwrap_or_else(|| {
            world
                .spawn((
                    Name::new("Tooltip"),
                    Node {
                        position_type: PositionType::Absolute,
                        max_width: Val::Vw(40.0),
                        padding: UiRect::axes(Val::Px(8.0), Val::Px(5.0)),
                        ..Default::default()
                    },
                    BackgroundColor(Color::srgba(0.1, 0.1, 0.12, 0.95)),
                    BorderRadius::all(Val::Px(4.0)),
                    // Positioned manually, so the UI transform propagation in
                    // `CatalogUiSystems::Placement` needs a `Transform` here.
                    Transform::default(),
                    Visibility::Hidden,
                    GlobalZIndex(999),
                ))
                .id()
        });

        let text = text.unwrap_or_else(|| {
            world
                .spawn((
                    Name::new("TooltipText"),
                    Text::default(),
                    TextFont::from_font_size(14.0),
                    TextColor(Color::WHITE),
                    ChildOf(container),
                ))
                .id()
        });

        Self { container, text }
    }
}

/// Flags an entity as having a hover tooltip.
///
/// The entity needs a `Transform` so the placement pass can resolve its
/// position.
#[derive(Component, Clone, Debug)]
#[require(Interaction)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Component)
)]
pub struct Tooltip {
    /// The text shown inside the tooltip.
    pub text: String,
    /// The side of the target on which the tooltip appears.
    pub side: TooltipSide,
    /// The hover duration before the tooltip appears (in milliseconds).
    pub delay: u16,
}

impl Tooltip {
    /// The default hover delay (in milliseconds).
    pub const DEFAULT_DELAY: u16 = 100;

    /// A tooltip with the given text, shown above its target after the
    /// default delay.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            side: TooltipSide::Top,
            delay: Self::DEFAULT_DELAY,
        }
    }

    /// Set the side of the target on which the tooltip appears.
    pub fn with_side(mut self, side: TooltipSide) -> Self {
        self.side = side;
        self
    }

    /// Set the hover delay (in milliseconds). Zero shows the tooltip on the
    /// first hovered frame.
    pub fn with_delay(mut self, delay: u16) -> Self {
        self.delay = delay;
        self
    }
}

impl From<&str> for Tooltip {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The side of the target entity on which the tooltip is placed.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub enum TooltipSide {
    /// Centered above the target.
    #[default]
    Top,
    /// Centered below the target.
    Bottom,
    /// Centered to the left of the target.
    Left,
    /// Centered to the right of the target.
    Right,
}

/// The gap between the tooltip and its target (in pixels).
const TOOLTIP_GAP: f32 = 6.0;

/// A [`Resource`] tracking which tooltip target is hovered and for how long.
#[derive(Resource, Clone, Debug)]
#[cfg_attr(
    feature = "bevy_reflect",
    derive(bevy_reflect::Reflect),
    reflect(Resource)
)]
pub(crate) struct HoverState {
    /// The current target entity, or [`Entity::PLACEHOLDER`].
    pub(crate) target: Entity,
    phase: HoverPhase,
    /// The side copied from the target's [`Tooltip`] on acquisition.
    pub(crate) side: TooltipSide,
    /// The remaining activation delay (in milliseconds).
    delay_left: u16,
}

impl HoverState {
    pub(crate) fn is_shown(&self) -> bool {
        matches!(self.phase, HoverPhase::Shown)
    }
}

impl Default for HoverState {
    fn default() -> Self {
        Self {
            target: Entity::PLACEHOLDER,
            phase: HoverPhase::Idle,
            side: TooltipSide::Top,
            delay_left: 0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
enum HoverPhase {
    /// No tooltip target is hovered.
    Idle,
    /// A target is hovered, but its activation delay has not elapsed.
    Waiting,
    /// A target is hovered and the tooltip is visible.
    Shown,
    /// The target was pressed; the tooltip stays hidden until the hover ends.
    Dismissed,
}

fn update_hover_state(
    mut state: ResMut<HoverState>,
    mut hide_tooltip: MessageWriter<HideTooltip>,
    mut show_tooltip: MessageWriter<ShowTooltip>,
    time: Res<Time>,
    target_query: Query<(Entity, &Tooltip, &Interaction)>,
) {
    let was_shown = state.is_shown();
    let old_target = state.target;

    // Find the hovered tooltip target, if any. A pressed target wins over a
    // hovered one.
    let mut found = None;
    for (entity, tooltip, interaction) in &target_query {
        match interaction {
            Interaction::Pressed => {
                found = Some((entity, tooltip, true));
                break;
            }
            Interaction::Hovered => found = Some((entity, tooltip, false)),
            Interaction::None => (),
        }
    }

    match found {
        None => {
            state.target = Entity::PLACEHOLDER;
            state.phase = HoverPhase::Idle;
        }
        Some((entity, tooltip, pressed)) => {
            if state.target != entity {
                state.target = entity;
                state.side = tooltip.side;
                state.delay_left = tooltip.delay;
                state.phase = HoverPhase::Waiting;
            }
            if pressed {
                state.phase = HoverPhase::Dismissed;
            } else if matches!(state.phase, HoverPhase::Waiting) {
                state.delay_left = state
                    .delay_left
                    .saturating_sub(time.delta().as_millis() as u16);
                if state.delay_left == 0 {
                    state.phase = HoverPhase::Shown;
                }
            }
        }
    }

    let now_shown = state.is_shown();
    if was_shown && (!now_shown || state.target != old_target) {
        hide_tooltip.write(HideTooltip);
    }
    if now_shown && (!was_shown || state.target != old_target) {
        show_tooltip.write(ShowTooltip);
    }
}

/// A message written when the primary tooltip should be hidden.
#[derive(Message)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
struct HideTooltip;

fn hide_tooltip(
    mut hide_tooltip: MessageReader<HideTooltip>,
    settings: Res<TooltipSettings>,
    mut visibility_query: Query<&mut Visibility>,
) {
    hide_tooltip.clear();
    *r!(visibility_query.get_mut(settings.container)) = Visibility::Hidden;
}

/// A message written when the primary tooltip should be shown.
#[derive(Message)]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
struct ShowTooltip;

fn show_tooltip(
    mut show_tooltip: MessageReader<ShowTooltip>,
    state: Res<HoverState>,
    settings: Res<TooltipSettings>,
    target_query: Query<&Tooltip>,
    mut text_query: Query<&mut Text>,
    mut visibility_query: Query<&mut Visibility>,
) {
    show_tooltip.clear();
    let tooltip = rq!(target_query.get(state.target));
    if let Ok(mut text) = text_query.get_mut(settings.text) {
        text.0 = tooltip.text.clone();
    }
    *r!(visibility_query.get_mut(settings.container)) = Visibility::Visible;
}

fn place_tooltip(
    state: Res<HoverState>,
    settings: Res<TooltipSettings>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    target_query: Query<(&GlobalTransform, &ComputedNode)>,
    mut tooltip_query: Query<(&mut Node, &mut Transform, &GlobalTransform, &ComputedNode)>,
) {
    rq!(state.is_shown());
    let (target_gt, target_node) = rq!(target_query.get(state.target));
    let (mut node, mut transform, gt, computed) =
        r!(tooltip_query.get_mut(settings.container));

    let target_rect =
        Rect::from_center_size(target_gt.translation().truncate(), target_node.size());
    let tooltip_rect = Rect::from_center_size(gt.translation().truncate(), computed.size());
    let half = tooltip_rect.half_size();

    let mut pos = match state.side {
        TooltipSide::Top => Vec2::new(
            target_rect.center().x,
            target_rect.min.y - TOOLTIP_GAP - half.y,
        ),
        TooltipSide::Bottom => Vec2::new(
            target_rect.center().x,
            target_rect.max.y + TOOLTIP_GAP + half.y,
        ),
        TooltipSide::Left => Vec2::new(
            target_rect.min.x - TOOLTIP_GAP - half.x,
            target_rect.center().y,
        ),
        TooltipSide::Right => Vec2::new(
            target_rect.max.x + TOOLTIP_GAP + half.x,
            target_rect.center().y,
        ),
    };

    // Clamp to the primary window, collapsing to the midpoint if the tooltip
    // is wider or taller than the window.
    if let Ok(window) = window_query.single() {
        let size = Vec2::new(window.physical_width() as f32, window.physical_height() as f32);
        let mut min = half;
        let mut max = size - half;
        if min.x > max.x {
            let mid = (min.x + max.x) / 2.0;
            min.x = mid;
            max.x = mid;
        }
        if min.y > max.y {
            let mid = (min.y + max.y) / 2.0;
            min.y = mid;
            max.y = mid;
        }
        pos = pos.clamp(min, max);
    }

    // Set position via `Node`, in logical pixels.
    let top_left = (pos - half) * computed.inverse_scale_factor();
    node.top = Val::Px(top_left.y);
    node.left = Val::Px(top_left.x);

    // This system runs after `UiSystems::Layout` so that the tooltip size is
    // calculated from the updated text. That means the `Node` position lands
    // one frame late, so the `Transform` is also written directly.
    transform.translation.x = pos.x;
    transform.translation.y = pos.y;
}
