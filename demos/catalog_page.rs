//! A software catalog page demonstrating every widget in the crate.

use bevy::color::palettes::tailwind::*;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::ui::Val::*;
use catalog_ui::prelude::*;

fn main() -> AppExit {
    App::new()
        .add_plugins((DefaultPlugins, CatalogUiPlugin::default()))
        .add_systems(Startup, spawn_scene)
        .add_systems(
            Update,
            (scroll_catalog, announce_installs, highlight_buttons),
        )
        .run()
}

const CATALOG: [(&str, &str, &str); 6] = [
    ("GIMP", "Editor de imagens", "https://example.com/gimp"),
    ("Blender", "Modelagem 3D", "https://example.com/blender"),
    ("Firefox", "Navegador web", "https://example.com/firefox"),
    ("LibreOffice", "Suíte de escritório", "https://example.com/libreoffice"),
    ("Inkscape", "Gráficos vetoriais", "https://example.com/inkscape"),
    ("VLC", "Reprodutor de mídia", "https://example.com/vlc"),
];

#[derive(Component)]
struct CatalogArea;

fn spawn_scene(mut commands: Commands) {
    commands.spawn(Camera2d);

    let area = commands
        .spawn((
            Node {
                width: Percent(100.0),
                height: Percent(100.0),
                flex_direction: FlexDirection::Column,
                row_gap: Px(12.0),
                padding: UiRect::all(Px(16.0)),
                overflow: Overflow::scroll_y(),
                ..default()
            },
            ScrollPosition::default(),
            CatalogArea,
        ))
        .id();

    for (name, blurb, url) in CATALOG {
        let card = commands
            .spawn((
                Node {
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    min_height: Px(96.0),
                    padding: UiRect::all(Px(12.0)),
                    ..default()
                },
                BackgroundColor(GRAY_800.into()),
                BorderRadius::all(Px(6.0)),
                ChildOf(area),
            ))
            .id();

        commands.spawn((
            Text::new(name),
            Tooltip::new(blurb),
            Transform::default(), // Required for tooltip positioning
            ChildOf(card),
        ));
        commands.spawn((
            Node {
                padding: UiRect::axes(Px(12.0), Px(6.0)),
                ..default()
            },
            BackgroundColor(BLUE_600.into()),
            BorderRadius::all(Px(4.0)),
            InstallButton::new(name, url),
            children![Text::new("Instalar")],
            ChildOf(card),
        ));
    }

    // Banners stack in the top-right corner.
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Px(16.0),
            right: Px(16.0),
            flex_direction: FlexDirection::Column,
            row_gap: Px(8.0),
            ..default()
        },
        NotificationArea,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            bottom: Px(16.0),
            right: Px(16.0),
            padding: UiRect::all(Px(10.0)),
            ..default()
        },
        BackgroundColor(GRAY_600.into()),
        BorderRadius::all(Px(18.0)),
        BackToTop { area },
        children![Text::new("↑")],
    ));
}

fn scroll_catalog(
    mut wheel: MessageReader<MouseWheel>,
    mut area_query: Query<&mut ScrollPosition, With<CatalogArea>>,
) {
    for event in wheel.read() {
        for mut scroll in &mut area_query {
            scroll.0.y = (scroll.0.y - event.y * 24.0).max(0.0);
        }
    }
}

fn announce_installs(
    mut launches: MessageReader<LaunchInstall>,
    mut notify: MessageWriter<Notify>,
) {
    for launch in launches.read() {
        notify.write(Notify::new(format!(
            "Instalação iniciada: {}",
            launch.software
        )));
    }
}

fn highlight_buttons(
    mut button_query: Query<(&Interaction, &mut BackgroundColor), With<InstallButton>>,
) {
    for (interaction, mut background_color) in &mut button_query {
        background_color.0 = match interaction {
            Interaction::None => BLUE_600.into(),
            _ => BLUE_500.into(),
        };
    }
}
