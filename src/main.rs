mod config;
mod input;
mod logging;
mod tapverse;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use input::{ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use tapverse::save::{self, KeyValueStore, MemoryStorage};
use tapverse::store::GameStore;
use tapverse::TapverseGame;
use time::SystemClock;

type Game = TapverseGame<Box<dyn KeyValueStore>, SystemClock>;

/// localStorage when the browser allows it, memory otherwise.
#[cfg(target_arch = "wasm32")]
fn open_storage() -> Box<dyn KeyValueStore> {
    match save::BrowserStorage::open() {
        Some(storage) => Box::new(storage),
        None => {
            log::warn!("localStorage unavailable, progress will not be kept");
            Box::new(MemoryStorage::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_storage() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStorage::new())
}

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();
    if click_x < 0.0 || click_y < 0.0 {
        return None;
    }

    let cell = cs.cell_at(click_x, click_y, rect.width(), rect.height());
    log::debug!(
        "click: pixel=({}, {}), cell={:?}, targets={}",
        mouse_x,
        mouse_y,
        cell,
        cs.targets.len()
    );
    cell
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let storage = open_storage();
    let config = save::load_config(&storage);
    let store = GameStore::open(storage, SystemClock, config);
    let game: Rc<RefCell<Game>> = Rc::new(RefCell::new(TapverseGame::new(store)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let matched = cs.hit_test(col, row);
            drop(cs);

            if let Some(action_id) = matched {
                game.borrow_mut().handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let size = f.area();
            click_state.borrow_mut().begin_frame(size.width, size.height);

            // Time-driven rules run once per frame, before drawing.
            let mut g = game.borrow_mut();
            g.tick();
            g.render(f, size, &click_state);
        }
    });

    Ok(())
}
