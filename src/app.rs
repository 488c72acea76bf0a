//! Interactive pad with terminal UI
//!
//! Wires one controller and one view to a shared bus and runs the
//! crossterm event loop: number keys and mouse presses go to the view,
//! `q`/`Esc` quits.

use crate::audio::AudioSink;
use crate::bus::{BeepEvent, MessageBus};
use crate::controller::BeepSetController;
use crate::error::DrumpadResult;
use crate::sample_loader::SampleBank;
use crate::settings::Settings;
use crate::view::PadView;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

/// Explicit replacement for process-wide state: the bus every component
/// talks through and the settings they were configured with
pub struct AppContext {
    pub bus: Rc<MessageBus<BeepEvent>>,
    pub settings: Settings,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            bus: Rc::new(MessageBus::new()),
            settings,
        }
    }

    pub fn sample_bank(&self) -> SampleBank {
        SampleBank::new(self.settings.sounds_dir.clone())
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.bus.destroy();
    }
}

enum KeyResult {
    Continue,
    Quit,
}

/// The drum pad: controller + view over the drum kit
pub struct PadApp {
    controller: BeepSetController,
    view: PadView,
    status_message: String,
}

impl PadApp {
    pub fn new(ctx: &AppContext, sink: Rc<dyn AudioSink>) -> DrumpadResult<Self> {
        let mut bank = ctx.sample_bank();
        let controller = BeepSetController::drums(Rc::clone(&ctx.bus), &mut bank, sink)?;

        let model = controller.model();
        let view = {
            let model = model.borrow();
            PadView::new(
                Rc::clone(&ctx.bus),
                &model,
                Rect::new(0, 0, 80, 24),
                ctx.settings.drum_margin,
            )
        };

        let missing = view.tiles().iter().filter(|t| !t.loaded).count();
        let status_message = if missing > 0 {
            format!(
                "{} sound(s) missing under {} - run `drumpad generate`",
                missing,
                ctx.settings.sounds_dir.display()
            )
        } else {
            "Ready".to_string()
        };

        Ok(Self {
            controller,
            view,
            status_message,
        })
    }

    pub fn view(&self) -> &PadView {
        &self.view
    }

    /// Run the pad until the user quits
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        self.shutdown();
        result
    }

    fn run_app(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        info!("Pad running");
        loop {
            self.view.tick();
            terminal.draw(|f| self.ui(f))?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    if let KeyResult::Quit = self.handle_key_event(key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    self.view.handle_mouse(mouse);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: event::KeyEvent) -> KeyResult {
        if key.kind != KeyEventKind::Press {
            return KeyResult::Continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => KeyResult::Quit,
            _ => {
                self.view.handle_key(key);
                KeyResult::Continue
            }
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(f.size());

        let title = Line::from(vec![
            Span::styled("drumpad", Style::default().fg(Color::Yellow)),
            Span::raw("  1-9 or click to play, q to quit"),
        ]);
        f.render_widget(Paragraph::new(title), chunks[0]);

        self.view.resize(chunks[1]);
        self.view.render(f);

        let status = Paragraph::new(self.status_message.as_str())
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(status, chunks[2]);
    }

    /// Tear down view, then controller (which destroys the kit)
    pub fn shutdown(&mut self) {
        self.view.destroy();
        self.controller.destroy();
        info!("Pad stopped");
    }
}
