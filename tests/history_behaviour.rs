use canvas_paint::filters::{Adjustments, Filter};
use canvas_paint::io::blank_raster;
use canvas_paint::{
    Canvas, CanvasEvent, EditorConfig, EventLog, EventOutcome, InputEvent, InputModifiers,
    ToolKind,
};
use egui::{Color32, Key, PointerButton, Pos2, pos2};

fn canvas_with_history(max_history_size: usize) -> Canvas {
    let config = EditorConfig {
        max_history_size,
        ..EditorConfig::default()
    };
    let mut canvas = Canvas::new(config);
    canvas.open_image(blank_raster(120, 120, Color32::WHITE));
    canvas
}

fn drag(canvas: &mut Canvas, from: Pos2, to: Pos2) -> EventOutcome {
    let modifiers = InputModifiers::NONE;
    canvas.handle_event(&InputEvent::pointer_down(from, PointerButton::Primary, modifiers));
    canvas.handle_event(&InputEvent::pointer_move(to, modifiers));
    canvas.handle_event(&InputEvent::pointer_up(to, PointerButton::Primary, modifiers))
}

fn click(canvas: &mut Canvas, pos: Pos2) {
    let modifiers = InputModifiers::NONE;
    canvas.handle_event(&InputEvent::pointer_down(pos, PointerButton::Primary, modifiers));
    canvas.handle_event(&InputEvent::pointer_up(pos, PointerButton::Primary, modifiers));
}

fn shape_kinds(canvas: &Canvas) -> Vec<&'static str> {
    let mut kinds: Vec<_> = canvas
        .document()
        .expect("document")
        .shapes()
        .iter()
        .map(|s| s.kind_name())
        .collect();
    kinds.sort_unstable();
    kinds
}

#[test]
fn history_length_is_bounded() {
    let mut canvas = canvas_with_history(20);
    for _ in 0..25 {
        canvas
            .apply_filter(|raster| Filter::Invert.apply(raster))
            .expect("filter applied");
    }
    assert_eq!(canvas.history().len(), 20);
    assert_eq!(canvas.history().current_index(), Some(19));
    assert!(canvas.can_undo());
    assert!(!canvas.can_redo());
}

#[test]
fn undo_then_redo_restores_everything() {
    let mut canvas = canvas_with_history(20);
    canvas.set_tool(ToolKind::Rectangle);
    drag(&mut canvas, pos2(10.0, 10.0), pos2(60.0, 40.0));
    canvas.set_tool(ToolKind::Line);
    drag(&mut canvas, pos2(5.0, 100.0), pos2(100.0, 100.0));
    canvas.set_tool(ToolKind::Brush);
    drag(&mut canvas, pos2(80.0, 10.0), pos2(80.0, 90.0));

    let document = canvas.document().expect("document");
    let raster = document.raster().clone();
    let shapes = document.shapes().to_vec();
    let flattened = canvas.flatten_to_image().expect("image");

    assert!(canvas.undo());
    assert_ne!(canvas.document().expect("document").raster(), &raster);
    assert!(canvas.redo());

    let document = canvas.document().expect("document");
    assert_eq!(document.raster(), &raster);
    assert_eq!(document.shapes(), shapes.as_slice());
    assert_eq!(canvas.flatten_to_image().expect("image"), flattened);
}

#[test]
fn new_edit_after_undo_prunes_redo() {
    let mut canvas = canvas_with_history(20);
    for filter in [Filter::Invert, Filter::Grayscale, Filter::Sepia] {
        canvas.apply_filter(|raster| filter.apply(raster)).expect("filter");
    }
    assert_eq!(canvas.history().len(), 4);

    assert!(canvas.undo());
    assert!(canvas.undo());
    assert_eq!(canvas.history().current_index(), Some(1));
    assert!(canvas.can_redo());

    canvas
        .apply_filter(|raster| Filter::FlipHorizontal.apply(raster))
        .expect("filter");
    assert_eq!(canvas.history().len(), 3);
    assert_eq!(canvas.history().current_index(), Some(2));
    assert!(!canvas.can_redo());
}

#[test]
fn undo_and_redo_at_the_ends_do_nothing() {
    let mut canvas = canvas_with_history(20);
    let before = canvas.document().expect("document").raster().clone();
    assert!(!canvas.undo());
    assert!(!canvas.redo());
    assert_eq!(canvas.document().expect("document").raster(), &before);
    assert_eq!(canvas.history().current_index(), Some(0));
}

#[test]
fn untracked_shapes_survive_undo() {
    let mut canvas = canvas_with_history(20);
    canvas.set_tool(ToolKind::Polygon);
    for point in [pos2(10.0, 10.0), pos2(50.0, 10.0), pos2(30.0, 40.0)] {
        click(&mut canvas, point);
    }
    canvas.handle_event(&InputEvent::key_down(Key::Enter, InputModifiers::NONE));
    canvas.set_tool(ToolKind::Ellipse);
    drag(&mut canvas, pos2(80.0, 80.0), pos2(100.0, 95.0));
    assert_eq!(shape_kinds(&canvas), vec!["ellipse", "polygon"]);

    assert!(canvas.undo());
    assert_eq!(shape_kinds(&canvas), vec!["polygon"]);
    assert!(canvas.redo());
    assert_eq!(shape_kinds(&canvas), vec!["ellipse", "polygon"]);
}

#[test]
fn shape_ids_are_kept_across_undo() {
    let mut canvas = canvas_with_history(20);
    canvas.set_tool(ToolKind::Rectangle);
    drag(&mut canvas, pos2(10.0, 10.0), pos2(40.0, 40.0));
    let id = canvas.document().expect("document").shapes()[0].id();
    drag(&mut canvas, pos2(60.0, 60.0), pos2(90.0, 90.0));

    assert!(canvas.undo());
    let document = canvas.document().expect("document");
    assert_eq!(document.shapes().len(), 1);
    assert!(document.shape(id).is_some());
}

#[test]
fn filters_are_undoable_and_reset_restarts() {
    let mut canvas = canvas_with_history(20);
    canvas
        .apply_filter(|raster| Filter::RotateClockwise.apply(raster))
        .expect("filter");
    canvas
        .apply_filter(|raster| Filter::Invert.apply(raster))
        .expect("filter");
    assert!(canvas.undo());
    let pixel = *canvas.document().expect("document").raster().get_pixel(0, 0);
    assert_eq!(pixel.0, [255, 255, 255]);

    canvas.reset_image().expect("reset");
    assert_eq!(canvas.history().len(), 1);
    assert!(!canvas.can_undo());
}

#[test]
fn adjustments_are_undoable() {
    let mut canvas = canvas_with_history(20);
    let darker = Adjustments {
        brightness: -55,
        ..Adjustments::default()
    };
    canvas.apply_filter(|raster| darker.apply(raster)).expect("adjusted");
    let pixel = *canvas.document().expect("document").raster().get_pixel(5, 5);
    assert_eq!(pixel.0, [200, 200, 200]);

    assert!(canvas.undo());
    let pixel = *canvas.document().expect("document").raster().get_pixel(5, 5);
    assert_eq!(pixel.0, [255, 255, 255]);
}

#[test]
fn availability_is_published() {
    let mut canvas = canvas_with_history(20);
    let log = EventLog::new();
    canvas.subscribe(Box::new(log.clone()));

    canvas.set_tool(ToolKind::Line);
    drag(&mut canvas, pos2(10.0, 10.0), pos2(50.0, 50.0));
    assert!(log.events().contains(&CanvasEvent::UndoAvailable(true)));
    log.drain();

    canvas.undo();
    let events = log.drain();
    assert!(events.contains(&CanvasEvent::UndoAvailable(false)));
    assert!(events.contains(&CanvasEvent::RedoAvailable(true)));
}

#[test]
fn history_size_comes_from_config() {
    let config = EditorConfig::from_json_str(r#"{ "max_history_size": 3 }"#).expect("valid");
    let mut canvas = Canvas::new(config);
    canvas.open_image(blank_raster(10, 10, Color32::WHITE));
    for _ in 0..5 {
        canvas
            .apply_filter(|raster| Filter::Invert.apply(raster))
            .expect("filter");
    }
    assert_eq!(canvas.history().len(), 3);
    assert_eq!(canvas.history().max_size(), 3);
}
