//! Integration tests for two-layer comparison.
//!
//! These tests render real layer stacks through the comparison renderer:
//! - Swipe at both extremes and in the middle
//! - Spyglass before and after the pointer arrives
//! - Blink driven by the controller's timer under paused tokio time
//! - Swapping the pair and leaving blink mode mid-playback

use std::time::Duration;

use image::Rgba;
use overlaymap::compare::{
    CompareController, CompareError, CompareRenderer, ComparisonMode, ComparisonState,
};
use overlaymap::composite::{Canvas, Compositor};
use overlaymap::layer::{Layer, LayerId, LayerPayload, LayerStack, RasterBuffer};

// =============================================================================
// Test Helpers
// =============================================================================

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const WIDTH: u32 = 100;
const HEIGHT: u32 = 40;

fn solid_layer(name: &str, color: Rgba<u8>) -> Layer {
    let image = RasterBuffer::from_pixel(WIDTH, HEIGHT, color);
    Layer::new(name, LayerPayload::Image(image), None)
}

/// A red 1890 survey and a blue 1920 survey.
fn survey_pair() -> (LayerStack, LayerId, LayerId) {
    let mut stack = LayerStack::new();
    let a = stack.push(solid_layer("survey 1890", RED));
    let b = stack.push(solid_layer("survey 1920", BLUE));
    (stack, a, b)
}

fn plain_renderer() -> CompareRenderer {
    CompareRenderer::new(Compositor::new()).with_chrome(false)
}

fn canvas() -> Canvas {
    Canvas::new(WIDTH, HEIGHT)
}

fn columns_of(frame: &RasterBuffer, color: Rgba<u8>) -> u32 {
    (0..frame.width())
        .filter(|&x| (0..frame.height()).all(|y| *frame.get_pixel(x, y) == color))
        .count() as u32
}

fn uniform(frame: &RasterBuffer, color: Rgba<u8>) -> bool {
    frame.pixels().all(|p| *p == color)
}

// =============================================================================
// Swipe
// =============================================================================

#[test]
fn test_swipe_midpoint_splits_the_canvas() {
    let (stack, a, b) = survey_pair();
    let mut state = ComparisonState::new(a, b);
    state.set_mode(ComparisonMode::Swipe);
    state.set_swipe_position(50.0);

    let frame = plain_renderer().render(&state, &stack, &canvas()).unwrap();

    assert_eq!(columns_of(&frame, RED), 50);
    assert_eq!(columns_of(&frame, BLUE), 50);
    assert_eq!(*frame.get_pixel(49, 0), RED);
    assert_eq!(*frame.get_pixel(50, 0), BLUE);
}

#[test]
fn test_swipe_extremes_show_one_layer() {
    let (stack, a, b) = survey_pair();
    let mut state = ComparisonState::new(a, b);
    state.set_mode(ComparisonMode::Swipe);

    state.set_swipe_position(0.0);
    let all_b = plain_renderer().render(&state, &stack, &canvas()).unwrap();
    assert!(uniform(&all_b, BLUE));

    state.set_swipe_position(100.0);
    let all_a = plain_renderer().render(&state, &stack, &canvas()).unwrap();
    assert!(uniform(&all_a, RED));
}

#[test]
fn test_swipe_position_is_clamped() {
    let (stack, a, b) = survey_pair();
    let mut state = ComparisonState::new(a, b);
    state.set_mode(ComparisonMode::Swipe);

    state.set_swipe_position(250.0);
    let frame = plain_renderer().render(&state, &stack, &canvas()).unwrap();
    assert!(uniform(&frame, RED));
}

#[test]
fn test_swap_mirrors_the_swipe() {
    let (stack, a, b) = survey_pair();
    let mut state = ComparisonState::new(a, b);
    state.set_mode(ComparisonMode::Swipe);
    state.set_swipe_position(30.0);
    state.swap();

    let frame = plain_renderer().render(&state, &stack, &canvas()).unwrap();
    assert_eq!(columns_of(&frame, BLUE), 30);
    assert_eq!(columns_of(&frame, RED), 70);
}

#[test]
fn test_divider_drawn_with_chrome() {
    let (stack, a, b) = survey_pair();
    let mut state = ComparisonState::new(a, b);
    state.set_mode(ComparisonMode::Swipe);

    let renderer = CompareRenderer::new(Compositor::new());
    let frame = renderer.render(&state, &stack, &canvas()).unwrap();

    assert_eq!(frame.get_pixel(50, 0).0, [255, 255, 255, 255]);
    assert_eq!(*frame.get_pixel(0, 0), RED);
    assert_eq!(*frame.get_pixel(WIDTH - 1, 0), BLUE);
}

// =============================================================================
// Spyglass
// =============================================================================

#[test]
fn test_spyglass_reveals_b_around_the_pointer() {
    let (stack, a, b) = survey_pair();
    let mut state = ComparisonState::new(a, b);
    state.set_mode(ComparisonMode::Spyglass);
    state.set_spyglass_radius(8.0);

    let before = plain_renderer().render(&state, &stack, &canvas()).unwrap();
    assert!(uniform(&before, RED));

    state.pointer_moved(50.0, 20.0);
    let after = plain_renderer().render(&state, &stack, &canvas()).unwrap();
    assert_eq!(*after.get_pixel(50, 20), BLUE);
    assert_eq!(*after.get_pixel(55, 20), BLUE);
    assert_eq!(*after.get_pixel(60, 20), RED);
    assert_eq!(*after.get_pixel(0, 0), RED);
}

// =============================================================================
// Blink
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_blink_alternates_rendered_layer() {
    let (stack, a, b) = survey_pair();
    let renderer = plain_renderer();
    let mut controller = CompareController::new(ComparisonState::new(a, b));
    controller.set_mode(ComparisonMode::Blink);
    controller
        .set_blink_interval(Duration::from_millis(100))
        .unwrap();

    let first = controller.render(&renderer, &stack, &canvas()).unwrap();
    assert!(uniform(&first, RED));

    assert!(controller.play().unwrap());
    tokio::time::sleep(Duration::from_millis(150)).await;
    let second = controller.render(&renderer, &stack, &canvas()).unwrap();
    assert!(uniform(&second, BLUE));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let third = controller.render(&renderer, &stack, &canvas()).unwrap();
    assert!(uniform(&third, RED));

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_switching_mode_stops_blinking() {
    let (stack, a, b) = survey_pair();
    let renderer = plain_renderer();
    let mut controller = CompareController::new(ComparisonState::new(a, b));
    controller.set_mode(ComparisonMode::Blink);
    controller
        .set_blink_interval(Duration::from_millis(100))
        .unwrap();
    controller.play().unwrap();

    controller.set_mode(ComparisonMode::Single);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(!controller.is_playing());
    let frame = controller.render(&renderer, &stack, &canvas()).unwrap();
    assert!(uniform(&frame, RED));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_removed_layer_is_reported() {
    let (mut stack, a, b) = survey_pair();
    stack.remove(b);

    let state = ComparisonState::new(a, b);
    let err = plain_renderer()
        .render(&state, &stack, &canvas())
        .unwrap_err();
    assert_eq!(err, CompareError::LayerNotFound { id: b });
}
