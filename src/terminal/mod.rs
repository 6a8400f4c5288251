// SPDX-License-Identifier: GPL-3.0-only

//! Interactive terminal interface
//!
//! Renders the live camera feed with Unicode half-block characters next to
//! the summary, whose photo section carries the captured still's preview.
//! The location panel sits below.

mod app;
pub mod widgets;

pub use app::{App, Completion, TerminalView};

use crate::backends::camera::pipewire::PipeWireDevice;
use crate::backends::location::{GeoClueProvider, GeolocationProvider};
use crate::config::Config;
use crate::constants::UI_TICK;
use crate::presenter::{Action, ActionState};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use widgets::{ActionBar, FrameWidget, StatusBar, SummaryPanel};

/// Run the interactive interface until the user quits
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let provider = runtime.block_on(GeoClueProvider::connect(config.location.desktop_id.clone()));
    info!(supported = provider.is_supported(), "Location provider ready");

    let mut app = App::new(
        &config,
        Arc::new(PipeWireDevice::new()),
        Arc::new(provider),
        runtime.handle().clone(),
    );
    app.refresh_summary();

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Stops the camera pipeline before the runtime goes away
    drop(app);
    runtime.shutdown_timeout(Duration::from_secs(1));

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    while !app.should_quit() {
        app.tick();
        terminal.draw(|f| draw(f, &app.view))?;

        if event::poll(UI_TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, view: &TerminalView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(f.area());

    let media = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let live_block = Block::default().borders(Borders::ALL).title(" Camera ");
    let live_inner = live_block.inner(media[0]);
    f.render_widget(live_block, media[0]);
    let placeholder = if view.action_state(Action::StartCamera) == ActionState::Done {
        "Waiting for camera..."
    } else {
        "Press 'c' to start the camera"
    };
    f.render_widget(FrameWidget::new(view.live.as_ref(), placeholder), live_inner);

    f.render_widget(
        SummaryPanel {
            summary: &view.summary,
            photo: view.photo.as_ref(),
        },
        media[1],
    );

    f.render_widget(ActionBar { actions: view.actions() }, rows[1]);

    let mut location_lines = Vec::new();
    if let Some((text, color)) = &view.location_status {
        location_lines.push(Line::styled(text.clone(), Style::default().fg(*color)));
    }
    if let Some(location) = &view.location {
        location_lines.push(Line::from(format!("Latitude:  {}", location.latitude)));
        location_lines.push(Line::from(format!("Longitude: {}", location.longitude)));
        location_lines.push(Line::from(format!("Accuracy:  {} meters", location.accuracy_meters)));
        location_lines.push(Line::styled(
            format!("Map ('o'): {}", location.map_link),
            Style::default().fg(Color::Cyan),
        ));
    }
    f.render_widget(
        Paragraph::new(location_lines).block(Block::default().borders(Borders::ALL).title(" Location ")),
        rows[2],
    );

    let (message, color) = view.status_line();
    f.render_widget(StatusBar { message, color }, rows[3]);
}
