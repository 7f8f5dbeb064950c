use crosswire_bidi::input::PointerType;

use super::*;

#[test]
fn test_modifier_mask() {
    let mut source = KeySource::default();
    assert_eq!(source.modifiers(), 0);
    source.alt = true;
    source.shift = true;
    assert_eq!(source.modifiers(), 9);
    source.ctrl = true;
    source.meta = true;
    assert_eq!(source.modifiers(), 15);
}

#[test]
fn test_button_bitmap() {
    assert_eq!(button_bit(0), 1);
    assert_eq!(button_bit(1), 4);
    assert_eq!(button_bit(2), 2);
    assert_eq!(button_bit(3), 8);
    assert_eq!(button_bit(4), 16);

    let mut pointer = PointerSource::new(PointerType::Mouse);
    pointer.register_press(0, 0);
    pointer.register_press(2, 0);
    assert_eq!(pointer.buttons_mask(), 3);
    pointer.release_count(0);
    assert_eq!(pointer.buttons_mask(), 2);
}

#[test]
fn test_double_click_then_reset() {
    let mut pointer = PointerSource::new(PointerType::Mouse);
    pointer.x = 10.0;
    pointer.y = 10.0;

    assert_eq!(pointer.register_press(0, 1_000), 1);
    pointer.release_count(0);
    // Second press within 400 ms at the same point: double click.
    assert_eq!(pointer.register_press(0, 1_400), 2);
    pointer.release_count(0);
    // A third would exceed CDP's maximum and resets to 1.
    assert_eq!(pointer.register_press(0, 1_800), 1);
}

#[test]
fn test_click_count_resets_outside_window() {
    let mut pointer = PointerSource::new(PointerType::Mouse);
    pointer.x = 10.0;
    pointer.y = 10.0;
    assert_eq!(pointer.register_press(0, 1_000), 1);
    pointer.release_count(0);
    assert_eq!(pointer.register_press(0, 1_600), 1);
}

#[test]
fn test_click_count_resets_outside_radius() {
    let mut pointer = PointerSource::new(PointerType::Mouse);
    pointer.x = 10.0;
    pointer.y = 10.0;
    assert_eq!(pointer.register_press(0, 1_000), 1);
    pointer.release_count(0);
    pointer.x = 15.0;
    assert_eq!(pointer.register_press(0, 1_100), 1);
}

#[test]
fn test_click_count_per_button() {
    let mut pointer = PointerSource::new(PointerType::Mouse);
    assert_eq!(pointer.register_press(0, 1_000), 1);
    // A different button has its own click context.
    assert_eq!(pointer.register_press(2, 1_050), 1);
}

#[test]
fn test_state_combined_modifiers() {
    let mut state = InputState::default();
    state.key_source("kb1").shift = true;
    state.key_source("kb2").ctrl = true;
    assert_eq!(state.modifiers(), 10);
}

#[tokio::test]
async fn test_state_manager_lifecycle() {
    let manager = InputStateManager::new(crate::clock::ManualClock::new(0));
    let state = manager.state_for("top").await;
    state.lock().await.key_source("kb").shift = true;

    // Same context returns the same state.
    let state_again = manager.state_for("top").await;
    assert_eq!(state_again.lock().await.modifiers(), 8);

    manager.remove("top").await;
    let fresh = manager.state_for("top").await;
    assert_eq!(fresh.lock().await.modifiers(), 0);
}
