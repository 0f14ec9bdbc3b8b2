// Pointer and wheel gesture interpretation
use super::window::Viewport;
use serde::{Deserialize, Serialize};

/// Primary (left) pointer button.
pub const PRIMARY_BUTTON: u8 = 0;

/// Raw input delivered by the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel {
        delta_y: f64,
    },
    PointerDown {
        x: f64,
        #[serde(default)]
        button: u8,
    },
    PointerMove {
        x: f64,
    },
    PointerUp,
    PointerLeave,
    Click,
    /// Click on the "reset zoom" affordance.
    ResetClick,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub is_dragging: bool,
    pub drag_start_x: f64,
    pub has_dragged: bool,
}

/// What the surface should do with the event after the engine has seen it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub window_changed: bool,
    pub activated: bool,
}

#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    drag: DragState,
    sensitivity: f64,
}

impl GestureInterpreter {
    /// `sensitivity` is the pixel distance that pans by one full window span.
    pub fn new(sensitivity: f64) -> Self {
        Self {
            drag: DragState::default(),
            sensitivity,
        }
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn handle(
        &mut self,
        event: &InputEvent,
        viewport: &mut Viewport,
        activate: Option<&mut dyn FnMut()>,
    ) -> EventResponse {
        let before = viewport.window();
        let mut response = EventResponse::default();

        match *event {
            InputEvent::Wheel { delta_y } => {
                if viewport.len() == 0 {
                    return response;
                }
                response.prevent_default = true;
                response.stop_propagation = true;
                if delta_y < 0.0 {
                    viewport.zoom_in();
                } else {
                    viewport.zoom_out();
                }
            }
            InputEvent::PointerDown { x, button } => {
                if button != PRIMARY_BUTTON {
                    return response;
                }
                response.stop_propagation = true;
                self.drag = DragState {
                    is_dragging: true,
                    drag_start_x: x,
                    has_dragged: false,
                };
            }
            InputEvent::PointerMove { x } => {
                if !self.drag.is_dragging || viewport.len() == 0 {
                    return response;
                }
                let diff = self.drag.drag_start_x - x;
                if viewport.pan_by(diff, self.sensitivity) != 0 {
                    self.drag.has_dragged = true;
                    self.drag.drag_start_x = x;
                }
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                self.drag.is_dragging = false;
            }
            InputEvent::Click => {
                if self.drag.has_dragged || self.drag.is_dragging {
                    response.stop_propagation = true;
                    self.drag.has_dragged = false;
                } else if viewport.len() > 0 {
                    if let Some(activate) = activate {
                        activate();
                        response.activated = true;
                    }
                }
            }
            InputEvent::ResetClick => {
                response.stop_propagation = true;
                viewport.reset_window();
            }
        }

        response.window_changed = viewport.window() != before;
        response
    }
}
