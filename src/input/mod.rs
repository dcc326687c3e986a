use egui::{Context, Event, Key, PointerButton, Pos2, Rect};

/// Modifier keys held when an input event happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputModifiers {
    pub shift: bool,
    pub alt: bool,
    /// Control, or Command on macOS
    pub ctrl: bool,
    pub space: bool,
}

impl InputModifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
        ctrl: false,
        space: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }
}

/// Input delivered to the canvas. Pointer positions are in view coordinates, relative
/// to the top-left corner of the canvas widget.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        pos: Pos2,
        button: PointerButton,
        modifiers: InputModifiers,
    },
    /// Mouse moved (with or without buttons pressed)
    PointerMove { pos: Pos2, modifiers: InputModifiers },
    /// Mouse button was released
    PointerUp {
        pos: Pos2,
        button: PointerButton,
        modifiers: InputModifiers,
    },
    DoubleClick {
        pos: Pos2,
        button: PointerButton,
        modifiers: InputModifiers,
    },
    /// Vertical wheel movement, positive away from the user
    Scroll {
        pos: Pos2,
        delta_y: f32,
        modifiers: InputModifiers,
    },
    KeyDown {
        key: Key,
        modifiers: InputModifiers,
        repeat: bool,
    },
    KeyUp { key: Key, modifiers: InputModifiers },
}

impl InputEvent {
    pub fn pointer_down(pos: Pos2, button: PointerButton, modifiers: InputModifiers) -> Self {
        InputEvent::PointerDown {
            pos,
            button,
            modifiers,
        }
    }

    pub fn pointer_move(pos: Pos2, modifiers: InputModifiers) -> Self {
        InputEvent::PointerMove { pos, modifiers }
    }

    pub fn pointer_up(pos: Pos2, button: PointerButton, modifiers: InputModifiers) -> Self {
        InputEvent::PointerUp {
            pos,
            button,
            modifiers,
        }
    }

    pub fn key_down(key: Key, modifiers: InputModifiers) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers,
            repeat: false,
        }
    }

    pub fn key_up(key: Key, modifiers: InputModifiers) -> Self {
        InputEvent::KeyUp { key, modifiers }
    }
}

const BUTTONS: [PointerButton; 3] = [
    PointerButton::Primary,
    PointerButton::Secondary,
    PointerButton::Middle,
];

/// Handles converting raw egui input into canvas [`InputEvent`]s
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    /// Buttons pressed inside the canvas and not yet released, indexed like `BUTTONS`
    pressed: [bool; 3],
    space_held: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process raw egui input for the canvas occupying `canvas_rect` (screen space).
    ///
    /// Presses, wheel movement and hover moves count only inside the canvas. Once a
    /// button went down inside, moves and the release are delivered wherever they happen.
    /// Keys are skipped while another widget has keyboard focus.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let keyboard_free = !ctx.wants_keyboard_input();
        let to_view = |pos: Pos2| (pos - canvas_rect.min).to_pos2();

        ctx.input(|input| {
            if keyboard_free {
                for event in &input.events {
                    if let Event::Key {
                        key,
                        pressed,
                        repeat,
                        modifiers,
                        ..
                    } = event
                    {
                        if *key == Key::Space && !repeat {
                            self.space_held = *pressed;
                        }
                        let modifiers = self.modifiers(modifiers);
                        events.push(if *pressed {
                            InputEvent::KeyDown {
                                key: *key,
                                modifiers,
                                repeat: *repeat,
                            }
                        } else {
                            InputEvent::KeyUp {
                                key: *key,
                                modifiers,
                            }
                        });
                    }
                }
            }

            let modifiers = self.modifiers(&input.modifiers);
            let hover = input.pointer.hover_pos();
            let inside = hover.is_some_and(|pos| canvas_rect.contains(pos));

            if let Some(pos) = hover {
                if Some(pos) != self.last_pointer_pos && (inside || self.pressed.contains(&true)) {
                    events.push(InputEvent::PointerMove {
                        pos: to_view(pos),
                        modifiers,
                    });
                }
                self.last_pointer_pos = Some(pos);
            }

            for (index, button) in BUTTONS.into_iter().enumerate() {
                if input.pointer.button_pressed(button) && inside {
                    if let Some(pos) = hover {
                        self.pressed[index] = true;
                        events.push(InputEvent::PointerDown {
                            pos: to_view(pos),
                            button,
                            modifiers,
                        });
                    }
                }
                if input.pointer.button_released(button) && self.pressed[index] {
                    self.pressed[index] = false;
                    if let Some(pos) = hover.or(self.last_pointer_pos) {
                        events.push(InputEvent::PointerUp {
                            pos: to_view(pos),
                            button,
                            modifiers,
                        });
                    }
                }
                if input.pointer.button_double_clicked(button) && inside {
                    if let Some(pos) = hover {
                        events.push(InputEvent::DoubleClick {
                            pos: to_view(pos),
                            button,
                            modifiers,
                        });
                    }
                }
            }

            let delta_y = input.raw_scroll_delta.y;
            if delta_y != 0.0 && inside {
                if let Some(pos) = hover {
                    events.push(InputEvent::Scroll {
                        pos: to_view(pos),
                        delta_y,
                        modifiers,
                    });
                }
            }
        });

        events
    }

    fn modifiers(&self, modifiers: &egui::Modifiers) -> InputModifiers {
        InputModifiers {
            shift: modifiers.shift,
            alt: modifiers.alt,
            ctrl: modifiers.command,
            space: self.space_held,
        }
    }
}
