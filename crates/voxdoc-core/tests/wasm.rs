//! In-browser smoke tests for the orchestration core.
//!
//! The full behavioral suite lives in `src/tests.rs` and runs
//! natively; this checks the pieces that matter in the real runtime.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use voxdoc_core::event_bus::EventBus;
use voxdoc_core::markup::{parse, Block};
use voxdoc_types::call::format_elapsed;
use voxdoc_types::event::AppEvent;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn event_bus_roundtrip() {
    let bus = EventBus::new();
    bus.emit(AppEvent::ActiveCleared);
    assert_eq!(bus.drain().len(), 1);
    assert!(!bus.has_pending());
}

#[wasm_bindgen_test]
fn markup_parses_in_browser() {
    let blocks = parse("**hi**\n- a\n- b");
    assert_eq!(blocks.len(), 2);
    assert!(matches!(blocks[1], Block::List(_)));
}

#[wasm_bindgen_test]
fn elapsed_formatting() {
    assert_eq!(format_elapsed(61), "01:01");
}
