//! Visualization control glue
//!
//! [`VizController`] mediates between the simulation driver and a GUI frame.
//! It is an explicitly constructed context object: the driver owns exactly
//! one per process and passes it by reference to the scheduler and GUI
//! layers. The frame itself stays behind the [`VisFrame`] trait, which is
//! the seam to whatever windowing toolkit hosts the panel.
//!
//! The controller moves through three states: uninitialized, initialized
//! but disabled, and enabled. Forwarding operations before `init` are
//! defined no-ops, and a second `init` is rejected; `shutdown` tears down
//! the owned frame and allows re-initialization.

use crate::{Error, Result};

/// Fixed visual theme applied to the frame on initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Background color name.
    pub background: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "black",
        }
    }
}

/// Frame abstraction owned by the controller.
///
/// Implementations wrap a concrete toolkit window/panel. The controller
/// calls these in a single-threaded (UI-thread) context.
pub trait VisFrame {
    /// One-time frame setup after construction.
    fn init(&mut self);

    /// Refresh the frame from current simulation state.
    fn update(&mut self);

    /// Reset the frame to its initial presentation.
    fn reset(&mut self);

    /// Enable or disable the frame's input controls.
    fn enable_buttons(&mut self, enabled: bool);

    /// Mark or unmark a cell as secreting in the frame's display.
    fn set_red_cell(&mut self, cell: u64, flag: bool);

    /// Map the frame's window.
    fn map_window(&mut self);

    /// Recompute the frame's layout.
    fn resize(&mut self);

    /// Map the frame's subwindows.
    fn map_subwindows(&mut self);

    /// Apply a background color.
    fn set_background(&mut self, color: &str);
}

/// Per-process visualization context.
///
/// Owns at most one frame; dropping the controller drops the frame.
pub struct VizController {
    frame: Option<Box<dyn VisFrame>>,
    enabled: bool,
    theme: Theme,
}

impl VizController {
    /// Create an uninitialized controller with the default theme.
    #[must_use]
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    /// Create an uninitialized controller with a specific theme.
    #[must_use]
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            frame: None,
            enabled: false,
            theme,
        }
    }

    /// Take ownership of `frame`, apply the theme, and run frame setup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if a frame is already owned.
    /// Call [`shutdown`](Self::shutdown) first to replace the frame.
    pub fn init(&mut self, mut frame: Box<dyn VisFrame>) -> Result<()> {
        if self.frame.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        frame.set_background(self.theme.background);
        frame.init();
        self.frame = Some(frame);
        Ok(())
    }

    /// Tear down the owned frame, returning to the uninitialized state.
    ///
    /// No-op when uninitialized. `init` may be called again afterwards.
    pub fn shutdown(&mut self) {
        self.frame = None;
        self.enabled = false;
    }

    /// Whether a frame is currently owned.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.frame.is_some()
    }

    /// Record the enabled flag and forward it to the frame's input controls.
    pub fn enable(&mut self, flag: bool) {
        self.enabled = flag;
        if let Some(frame) = &mut self.frame {
            frame.enable_buttons(flag);
        }
    }

    /// Last value passed to [`enable`](Self::enable); `false` before any
    /// call. Queried by the scheduler to decide whether to perform
    /// visualization work on a given step.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Refresh the frame. No-op when uninitialized.
    pub fn update(&mut self) {
        if let Some(frame) = &mut self.frame {
            frame.update();
        }
    }

    /// Reset the frame. No-op when uninitialized.
    pub fn reset(&mut self) {
        if let Some(frame) = &mut self.frame {
            frame.reset();
        }
    }

    /// Forward a mark/unmark signal for a secreting cell to the frame.
    pub fn set_red_cell(&mut self, cell: u64, flag: bool) {
        tracing::info!(cell, flag, "setting secretion cell");
        if let Some(frame) = &mut self.frame {
            frame.set_red_cell(cell, flag);
        }
    }

    /// Force a window remap, resize, and subwindow remap.
    /// No-op when uninitialized.
    pub fn redraw(&mut self) {
        if let Some(frame) = &mut self.frame {
            frame.map_window();
            frame.resize();
            frame.map_subwindows();
        }
    }
}

impl Default for VizController {
    fn default() -> Self {
        Self::new()
    }
}
