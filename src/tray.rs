use std::time::Instant;

use anyhow::{Context, Result};
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tray_icon::{
    menu::{self, IconMenuItem, Menu, MenuEvent},
    Icon, TrayIcon, TrayIconBuilder,
};

use crate::battery::TelemetryReader;
use crate::canvas::Canvas;
use crate::config::{Rgba, Settings, REFRESH_INTERVAL};
use crate::monitor::{ErrorDialog, Flow, Monitor, TraySink};
use crate::notify::DesktopNotifier;
use crate::renderer::{self, IconRenderer};

const EXIT_LABEL: &str = "Exit";
const MENU_ICON_SIZE: u32 = 16;
const MENU_ICON_COLOR: Rgba = [0xE0, 0x40, 0x40, 0xFF];

enum UserEvent {
    Menu(MenuEvent),
    Quit,
}

/// The live tray icon plus the bubble notifier attached to it.
struct Tray {
    icon: TrayIcon,
    notifier: DesktopNotifier,
}

impl TraySink for Tray {
    fn set_icon(&mut self, canvas: &Canvas, tooltip: &str) -> Result<()> {
        let icon = Icon::from_rgba(canvas.to_rgba(), canvas.width(), canvas.height())
            .context("Failed to convert canvas to tray icon")?;
        self.icon.set_icon(Some(icon)).context("Failed to set tray icon")?;
        self.icon
            .set_tooltip(Some(tooltip))
            .context("Failed to set tray tooltip")?;
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notifier.bubble(message);
    }
}

struct Running {
    tray: Tray,
    monitor: Monitor,
}

fn exit_icon() -> Option<menu::Icon> {
    let glyph = renderer::close_glyph(MENU_ICON_SIZE, MENU_ICON_COLOR).ok()?;
    match menu::Icon::from_rgba(glyph.to_rgba(), glyph.width(), glyph.height()) {
        Ok(icon) => Some(icon),
        Err(e) => {
            log::warn!("Exit menu icon unavailable: {}", e);
            None
        }
    }
}

fn build_menu() -> Result<(Menu, IconMenuItem)> {
    let menu = Menu::new();
    let exit_item = IconMenuItem::new(EXIT_LABEL, true, exit_icon(), None);
    menu.append(&exit_item).context("Failed to build tray menu")?;
    Ok((menu, exit_item))
}

/// Canvas side: the tray's own icon geometry when the platform reports it.
fn icon_size(tray: &TrayIcon, fallback: u32) -> u32 {
    match tray.rect().map(|r| r.size.width) {
        Some(width) if (8..=512).contains(&width) => width,
        _ => fallback,
    }
}

fn start(settings: &Settings, menu: &Menu) -> Result<Running> {
    let icon = TrayIconBuilder::new()
        .with_menu(Box::new(menu.clone()))
        .with_tooltip(env!("CARGO_PKG_NAME"))
        .build()
        .context("There is no system tray.")?;

    let size = icon_size(&icon, settings.icon_size);
    log::info!("Tray icon created, canvas {}x{}", size, size);

    let renderer = IconRenderer::new(size, settings.palette)?;
    let reader = TelemetryReader::new(&settings.battery_dir);
    Ok(Running {
        tray: Tray {
            icon,
            notifier: DesktopNotifier,
        },
        monitor: Monitor::new(reader, renderer),
    })
}

pub fn run(settings: Settings) -> Result<()> {
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();

    let proxy = event_loop.create_proxy();
    MenuEvent::set_event_handler(Some(move |event| {
        let _ = proxy.send_event(UserEvent::Menu(event));
    }));

    let proxy = event_loop.create_proxy();
    ctrlc::set_handler(move || {
        let _ = proxy.send_event(UserEvent::Quit);
    })
    .context("Failed to set signal handler")?;

    let (menu, exit_item) = build_menu()?;
    let mut dialog = DesktopNotifier;

    // Created once the event loop is running
    let mut running: Option<Running> = None;
    let mut next_tick = Instant::now();

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::WaitUntil(next_tick);

        let tick = match event {
            Event::NewEvents(StartCause::Init) => match start(&settings, &menu) {
                Ok(r) => {
                    running = Some(r);
                    true
                }
                Err(e) => {
                    log::error!("{:#}", e);
                    dialog.show_blocking(&e.to_string());
                    *control_flow = ControlFlow::Exit;
                    false
                }
            },
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => true,
            Event::UserEvent(UserEvent::Menu(event)) if event.id == exit_item.id() => {
                log::info!("Exit requested from tray menu");
                *control_flow = ControlFlow::Exit;
                false
            }
            Event::UserEvent(UserEvent::Quit) => {
                log::info!("Interrupted, exiting");
                *control_flow = ControlFlow::Exit;
                false
            }
            _ => false,
        };

        if !tick {
            return;
        }
        let Some(r) = running.as_mut() else { return };

        let started = Instant::now();
        match r.monitor.tick(&mut r.tray, &mut dialog) {
            Flow::Continue => {
                next_tick += REFRESH_INTERVAL;
                if next_tick <= started {
                    // Fell behind (suspend, slow dialog); restart the cadence
                    next_tick = started + REFRESH_INTERVAL;
                }
                *control_flow = ControlFlow::WaitUntil(next_tick);
            }
            Flow::Exit => {
                running.take();
                *control_flow = ControlFlow::Exit;
            }
        }
    })
}
