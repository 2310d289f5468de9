//! Comparison state plus its blink timer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use super::blink::BlinkTimer;
use super::render::CompareRenderer;
use super::state::{ComparisonMode, ComparisonState};
use super::CompareError;
use crate::composite::Canvas;
use crate::layer::{LayerId, LayerStack, RasterBuffer};

/// Owns a [`ComparisonState`] and the timer that drives blink mode.
///
/// Every transition that stops blinking cancels the timer while holding the
/// state lock, so no toggle lands after the transition returns.
#[derive(Debug)]
pub struct CompareController {
    state: Arc<Mutex<ComparisonState>>,
    timer: Option<BlinkTimer>,
}

impl CompareController {
    pub fn new(state: ComparisonState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            timer: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ComparisonState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ComparisonState {
        self.lock().clone()
    }

    pub fn mode(&self) -> ComparisonMode {
        self.lock().mode()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().is_playing()
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Applies `f` to the state. Blink playback is not started or stopped.
    pub fn update<R>(&self, f: impl FnOnce(&mut ComparisonState) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn set_layers(&self, layer_a: LayerId, layer_b: LayerId) {
        self.lock().set_layers(layer_a, layer_b);
    }

    pub fn swap(&self) {
        self.lock().swap();
    }

    /// Switches mode. Leaving blink mode stops the timer.
    pub fn set_mode(&mut self, mode: ComparisonMode) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let changed = state.set_mode(mode);
        if changed {
            if let Some(timer) = self.timer.take() {
                timer.cancel();
            }
        }
        changed
    }

    /// Starts blinking. Returns false outside blink mode.
    ///
    /// Must be called within a tokio runtime.
    pub fn play(&mut self) -> Result<bool, CompareError> {
        {
            let mut state = self.lock();
            if !state.play() {
                return Ok(false);
            }
        }
        if self.timer.is_none() {
            match BlinkTimer::for_state(Arc::clone(&self.state)) {
                Ok(timer) => self.timer = Some(timer),
                Err(e) => {
                    self.lock().pause();
                    return Err(e);
                }
            }
            info!("Blink playback started");
        }
        Ok(true)
    }

    /// Freezes blinking on the current layer.
    pub fn pause(&mut self) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            debug!("Blink playback paused");
        }
        state.pause()
    }

    /// Changes the blink period, restarting the timer if it is running.
    pub fn set_blink_interval(&mut self, interval: Duration) -> Result<bool, CompareError> {
        if !self.lock().set_blink_interval(interval) {
            return Ok(false);
        }
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            self.timer = Some(BlinkTimer::for_state(Arc::clone(&self.state))?);
        }
        Ok(true)
    }

    /// Renders the current frame.
    pub fn render(
        &self,
        renderer: &CompareRenderer,
        stack: &LayerStack,
        canvas: &Canvas,
    ) -> Result<RasterBuffer, CompareError> {
        let state = self.lock();
        renderer.render(&state, stack, canvas)
    }

    /// Stops the timer and waits for it to finish.
    pub async fn shutdown(mut self) -> ComparisonState {
        if let Some(timer) = self.timer.take() {
            timer.stop().await;
        }
        self.snapshot()
    }
}
