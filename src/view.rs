//! Pad grid view
//!
//! One tile per sound, laid out in two rows inside a container area.
//! Activating a tile (number key or left mouse press) publishes a
//! [`BeepEvent`] with the tile's name. The view never looks sounds up or
//! plays them; whoever listens on the bus decides what a name means.

use crate::beep_set::BeepSet;
use crate::bus::{events, BeepEvent, MessageBus};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::rc::Rc;
use tracing::debug;

/// Frames a tile stays highlighted after activation
const FLASH_FRAMES: u8 = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub name: String,
    pub hotkey: Option<char>,
    pub area: Rect,
    /// Whether the sound behind this tile has audio loaded
    pub loaded: bool,
}

/// Tile rectangles for `count` tiles: two rows, `ceil(count / 2)` columns,
/// `margin` cells around and between tiles.
pub fn layout_tiles(count: usize, container: Rect, margin: u16) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let columns = (if count % 2 == 0 { count / 2 } else { (count + 1) / 2 }) as u32;
    let margin = margin as u32;
    let width = (container.width as u32).saturating_sub(margin * (columns + 1)) / columns;
    let height = (container.height as u32).saturating_sub(margin * 3) / 2;

    (0..count as u32)
        .map(|i| {
            let column = i % columns;
            let row = i / columns;
            let x = container.x as u32 + margin + column * (width + margin);
            let y = container.y as u32 + margin + row * (height + margin);
            Rect::new(
                clamp_u16(x),
                clamp_u16(y),
                clamp_u16(width),
                clamp_u16(height),
            )
        })
        .collect()
}

fn clamp_u16(value: u32) -> u16 {
    value.min(u16::MAX as u32) as u16
}

fn hotkey_for(index: usize) -> Option<char> {
    char::from_digit(index as u32 + 1, 10)
}

/// Grid of pad tiles publishing beep events
pub struct PadView {
    bus: Rc<MessageBus<BeepEvent>>,
    tiles: Vec<Tile>,
    container: Option<Rect>,
    margin: u16,
    listening: bool,
    flash: Option<(usize, u8)>,
}

impl PadView {
    /// Build one tile per sound in `model`, in the model's key order
    pub fn new(
        bus: Rc<MessageBus<BeepEvent>>,
        model: &BeepSet,
        container: Rect,
        margin: u16,
    ) -> Self {
        let areas = layout_tiles(model.len(), container, margin);
        let tiles: Vec<Tile> = model
            .iter()
            .zip(areas)
            .enumerate()
            .map(|(index, ((name, beep), area))| Tile {
                name: name.to_string(),
                hotkey: hotkey_for(index),
                area,
                loaded: beep.is_loaded(),
            })
            .collect();
        debug!("Pad view with {} tiles", tiles.len());

        Self {
            bus,
            tiles,
            container: Some(container),
            margin,
            listening: true,
            flash: None,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn container(&self) -> Option<Rect> {
        self.container
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Re-layout the tiles for a new container area
    pub fn resize(&mut self, container: Rect) {
        if !self.listening || self.container == Some(container) {
            return;
        }
        let areas = layout_tiles(self.tiles.len(), container, self.margin);
        for (tile, area) in self.tiles.iter_mut().zip(areas) {
            tile.area = area;
        }
        self.container = Some(container);
    }

    /// Index of the tile covering a terminal cell
    pub fn tile_at(&self, column: u16, row: u16) -> Option<usize> {
        self.tiles.iter().position(|tile| {
            let area = tile.area;
            column >= area.x
                && column < area.x.saturating_add(area.width)
                && row >= area.y
                && row < area.y.saturating_add(area.height)
        })
    }

    /// Publish the beep event for tile `index`. Returns false if nothing was sent.
    pub fn activate(&mut self, index: usize) -> bool {
        if !self.listening {
            return false;
        }
        let Some(tile) = self.tiles.get(index) else {
            return false;
        };

        self.bus
            .publish(events::BEEP, &BeepEvent::new(tile.name.as_str()));
        self.flash = Some((index, FLASH_FRAMES));
        true
    }

    /// Number keys activate the matching tile
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => match self.tiles.iter().position(|t| t.hotkey == Some(c)) {
                Some(index) => self.activate(index),
                None => false,
            },
            _ => false,
        }
    }

    /// Left button press on a tile activates it
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.tile_at(mouse.column, mouse.row) {
                    Some(index) => self.activate(index),
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Advance the activation highlight by one frame
    pub fn tick(&mut self) {
        if let Some((index, frames)) = self.flash {
            self.flash = if frames > 1 { Some((index, frames - 1)) } else { None };
        }
    }

    /// Index of the highlighted tile, if any
    pub fn flashing(&self) -> Option<usize> {
        self.flash.map(|(index, _)| index)
    }

    pub fn render(&self, f: &mut Frame) {
        for (index, tile) in self.tiles.iter().enumerate() {
            if tile.area.width == 0 || tile.area.height == 0 {
                continue;
            }

            let style = if self.flashing() == Some(index) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if tile.loaded {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let title = tile.hotkey.map(|c| format!(" {} ", c)).unwrap_or_default();
            let block = Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(style);

            // Center the label vertically inside the border
            let padding = (tile.area.height.saturating_sub(2) / 2).saturating_sub(1) as usize;
            let mut lines = vec![Line::from(""); padding];
            lines.push(Line::from(tile.name.as_str()));
            if !tile.loaded {
                lines.push(Line::from("(no sound)"));
            }

            let paragraph = Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center);
            f.render_widget(paragraph, tile.area);
        }
    }

    /// Stop reacting to input and drop all tiles. Does not touch the model.
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        self.listening = false;
        self.tiles.clear();
        self.container = None;
        self.flash = None;
    }
}
