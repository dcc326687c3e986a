use canvas_paint::io::blank_raster;
use canvas_paint::{
    Canvas, CanvasEvent, CursorHint, EditorError, EventLog, EventOutcome, InputEvent,
    InputModifiers, ShapeKind, StaticClipboard, ToolKind,
};
use egui::{Color32, Key, PointerButton, Pos2, pos2, vec2};
use image::Rgb;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

fn white_canvas(width: u32, height: u32) -> Canvas {
    let mut canvas = Canvas::default();
    canvas.open_image(blank_raster(width, height, Color32::WHITE));
    canvas
}

fn press(canvas: &mut Canvas, pos: Pos2, button: PointerButton, modifiers: InputModifiers) -> EventOutcome {
    canvas.handle_event(&InputEvent::pointer_down(pos, button, modifiers))
}

fn release(canvas: &mut Canvas, pos: Pos2, button: PointerButton, modifiers: InputModifiers) -> EventOutcome {
    canvas.handle_event(&InputEvent::pointer_up(pos, button, modifiers))
}

fn drag(canvas: &mut Canvas, path: &[Pos2]) -> EventOutcome {
    let modifiers = InputModifiers::NONE;
    let (first, last) = (path[0], path[path.len() - 1]);
    press(canvas, first, PointerButton::Primary, modifiers);
    for pos in &path[1..] {
        canvas.handle_event(&InputEvent::pointer_move(*pos, modifiers));
    }
    release(canvas, last, PointerButton::Primary, modifiers)
}

fn click(canvas: &mut Canvas, pos: Pos2, button: PointerButton) -> EventOutcome {
    press(canvas, pos, button, InputModifiers::NONE);
    release(canvas, pos, button, InputModifiers::NONE)
}

fn ctrl_key(canvas: &mut Canvas, key: Key) -> EventOutcome {
    canvas.handle_event(&InputEvent::key_down(key, InputModifiers::ctrl()))
}

fn pixel(canvas: &Canvas, x: u32, y: u32) -> Rgb<u8> {
    let flat = canvas.flatten_to_image().expect("image loaded");
    *flat.get_pixel(x, y)
}

fn draw_rectangle(canvas: &mut Canvas) {
    canvas.set_tool(ToolKind::Rectangle);
    canvas.set_brush_size(2);
    let outcome = drag(canvas, &[pos2(50.0, 50.0), pos2(150.0, 150.0)]);
    assert_eq!(outcome, EventOutcome::Committed);
}

#[test]
fn rectangle_outline_is_drawn() {
    let mut canvas = white_canvas(500, 500);
    draw_rectangle(&mut canvas);

    let document = canvas.document().expect("document");
    assert_eq!(document.shapes().len(), 1);
    assert!(matches!(document.shapes()[0].kind(), ShapeKind::Rectangle(_)));
    assert!(document.preview().is_none());
    assert_eq!(pixel(&canvas, 50, 100), BLACK);
    assert_eq!(pixel(&canvas, 100, 100), WHITE);
    assert_eq!(canvas.history().len(), 2);
}

#[test]
fn shape_preview_follows_the_pointer() {
    let mut canvas = white_canvas(200, 200);
    canvas.set_tool(ToolKind::Ellipse);
    press(&mut canvas, pos2(100.0, 100.0), PointerButton::Primary, InputModifiers::NONE);
    canvas.handle_event(&InputEvent::pointer_move(pos2(130.0, 90.0), InputModifiers::NONE));
    assert_eq!(canvas.gesture().state_name(), "Shape");
    assert!(canvas.document().expect("document").preview().is_some());
    assert!(canvas.document().expect("document").shapes().is_empty());

    release(&mut canvas, pos2(130.0, 90.0), PointerButton::Primary, InputModifiers::NONE);
    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.kind_name(), "ellipse");
    assert_eq!(shape.position(), pos2(70.0, 90.0));
}

#[test]
fn zero_size_shape_is_abandoned() {
    let mut canvas = white_canvas(100, 100);
    canvas.set_tool(ToolKind::Rectangle);
    let outcome = drag(&mut canvas, &[pos2(20.0, 20.0), pos2(20.0, 20.0)]);
    assert_eq!(
        outcome,
        EventOutcome::Abandoned(EditorError::DegenerateShape("rectangle"))
    );
    let document = canvas.document().expect("document");
    assert!(document.shapes().is_empty());
    assert!(document.preview().is_none());
    assert!(canvas.gesture().is_idle());
    assert_eq!(canvas.history().len(), 1);
}

#[test]
fn brush_stroke_paints_and_undoes() {
    let mut canvas = white_canvas(100, 100);
    canvas.set_tool(ToolKind::Brush);
    canvas.set_brush_size(5);
    let outcome = drag(
        &mut canvas,
        &[pos2(10.0, 10.0), pos2(10.0, 30.0), pos2(10.0, 50.0)],
    );
    assert_eq!(outcome, EventOutcome::Committed);
    assert_eq!(canvas.history().len(), 2);

    // Everything within half the pen width of the stroke is painted
    let flattened = canvas.flatten_to_image().expect("image");
    let unpainted: Vec<(u32, u32)> = (8..=12)
        .flat_map(|x| (10..=50).map(move |y| (x, y)))
        .filter(|&(x, y)| *flattened.get_pixel(x, y) != BLACK)
        .collect();
    assert!(unpainted.is_empty(), "unpainted: {unpainted:?}");
    assert_eq!(*flattened.get_pixel(20, 30), WHITE);

    assert!(canvas.undo());
    let raster = canvas.document().expect("document").raster();
    assert!(raster.pixels().all(|p| *p == WHITE));
}

#[test]
fn brush_click_without_movement_records_nothing() {
    let mut canvas = white_canvas(50, 50);
    canvas.set_tool(ToolKind::Brush);
    let outcome = click(&mut canvas, pos2(10.0, 10.0), PointerButton::Primary);
    assert_eq!(outcome, EventOutcome::Handled);
    assert_eq!(canvas.history().len(), 1);
}

#[test]
fn shift_right_click_continues_previous_stroke() {
    let mut canvas = white_canvas(100, 100);
    canvas.set_tool(ToolKind::Brush);
    canvas.set_brush_size(3);
    drag(&mut canvas, &[pos2(10.0, 10.0), pos2(10.0, 50.0)]);

    let shift = InputModifiers::shift();
    press(&mut canvas, pos2(50.0, 50.0), PointerButton::Secondary, shift);
    let outcome = release(&mut canvas, pos2(50.0, 50.0), PointerButton::Secondary, shift);
    assert_eq!(outcome, EventOutcome::Committed);
    assert_eq!(pixel(&canvas, 30, 50), BLACK);
    assert_eq!(canvas.history().len(), 3);
}

#[test]
fn alt_right_drag_resizes_the_brush() {
    let mut canvas = white_canvas(100, 100);
    let log = EventLog::new();
    canvas.subscribe(Box::new(log.clone()));
    canvas.set_tool(ToolKind::Brush);
    canvas.set_brush_size(20);

    let alt = InputModifiers::alt();
    press(&mut canvas, pos2(50.0, 50.0), PointerButton::Secondary, alt);
    for x in [60.0, 70.0, 65.0] {
        canvas.handle_event(&InputEvent::pointer_move(pos2(x, 50.0), alt));
    }
    release(&mut canvas, pos2(65.0, 50.0), PointerButton::Secondary, alt);

    assert_eq!(canvas.style().brush_size, 21);
    let sizes: Vec<u32> = log
        .events()
        .into_iter()
        .filter_map(|event| match event {
            CanvasEvent::BrushSizeChanged(size) => Some(size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![20, 21, 22, 21]);
    assert_eq!(pixel(&canvas, 60, 50), WHITE);
}

#[test]
fn alt_click_and_eyedropper_pick_colors() {
    let mut canvas = Canvas::default();
    canvas.open_image(blank_raster(40, 40, Color32::from_rgb(200, 10, 10)));
    let log = EventLog::new();
    canvas.subscribe(Box::new(log.clone()));

    canvas.set_tool(ToolKind::Brush);
    press(&mut canvas, pos2(5.0, 5.0), PointerButton::Primary, InputModifiers::alt());
    release(&mut canvas, pos2(5.0, 5.0), PointerButton::Primary, InputModifiers::alt());
    assert_eq!(canvas.style().first_color, Color32::from_rgb(200, 10, 10));
    assert!(log.events().contains(&CanvasEvent::ColorPicked(Color32::from_rgb(200, 10, 10))));

    canvas.set_first_color(Color32::BLACK);
    canvas.set_tool(ToolKind::Eyedropper);
    let outcome = click(&mut canvas, pos2(39.5, 39.5), PointerButton::Primary);
    assert_eq!(outcome, EventOutcome::Ignored);
    assert_eq!(canvas.style().first_color, Color32::from_rgb(200, 10, 10));

    let outcome = press(&mut canvas, pos2(45.0, 5.0), PointerButton::Primary, InputModifiers::NONE);
    assert!(matches!(
        outcome,
        EventOutcome::Abandoned(EditorError::OutOfBounds { .. })
    ));
}

#[test]
fn polygon_is_finished_by_double_click() {
    let mut canvas = white_canvas(200, 200);
    canvas.set_tool(ToolKind::Polygon);
    for point in [pos2(10.0, 10.0), pos2(100.0, 10.0), pos2(50.0, 80.0)] {
        click(&mut canvas, point, PointerButton::Primary);
    }
    assert_eq!(canvas.polygon_points().len(), 3);

    let outcome = canvas.handle_event(&InputEvent::DoubleClick {
        pos: pos2(50.0, 80.0),
        button: PointerButton::Primary,
        modifiers: InputModifiers::NONE,
    });
    assert_eq!(outcome, EventOutcome::Committed);

    let document = canvas.document().expect("document");
    assert_eq!(document.shapes().len(), 1);
    match document.shapes()[0].kind() {
        ShapeKind::Polygon(polygon) => assert_eq!(polygon.points.len(), 3),
        other => panic!("expected a polygon, got {other:?}"),
    }
    assert!(canvas.polygon_points().is_empty());
    // Polygons stay out of history
    assert_eq!(canvas.history().len(), 1);
}

#[test]
fn polygon_with_two_points_is_discarded() {
    let mut canvas = white_canvas(200, 200);
    canvas.set_tool(ToolKind::Polygon);
    click(&mut canvas, pos2(10.0, 10.0), PointerButton::Primary);
    click(&mut canvas, pos2(100.0, 10.0), PointerButton::Primary);

    let outcome = canvas.handle_event(&InputEvent::key_down(Key::Enter, InputModifiers::NONE));
    assert_eq!(outcome, EventOutcome::Abandoned(EditorError::NotEnoughPoints(2)));
    assert!(canvas.document().expect("document").shapes().is_empty());
    assert!(canvas.polygon_points().is_empty());
}

#[test]
fn crop_outside_the_image_changes_nothing() {
    let mut canvas = white_canvas(500, 500);
    canvas.set_tool(ToolKind::Crop);
    let outcome = drag(&mut canvas, &[pos2(600.0, 600.0), pos2(700.0, 700.0)]);
    assert!(matches!(
        outcome,
        EventOutcome::Abandoned(EditorError::EmptyCrop { .. })
    ));
    let document = canvas.document().expect("document");
    assert_eq!((document.width(), document.height()), (500, 500));
    assert!(document.preview().is_none());
    assert_eq!(canvas.history().len(), 1);
}

#[test]
fn crop_moves_shapes_with_the_pixels() {
    let mut canvas = white_canvas(500, 500);
    canvas.set_tool(ToolKind::Rectangle);
    drag(&mut canvas, &[pos2(150.0, 150.0), pos2(200.0, 180.0)]);

    canvas.set_tool(ToolKind::Crop);
    let outcome = drag(&mut canvas, &[pos2(100.0, 100.0), pos2(300.0, 200.0)]);
    assert_eq!(outcome, EventOutcome::Committed);

    let document = canvas.document().expect("document");
    assert_eq!((document.width(), document.height()), (200, 100));
    assert_eq!(document.shapes()[0].position(), pos2(50.0, 50.0));
    assert_eq!(canvas.history().len(), 1);
    assert!(!canvas.can_undo());
}

#[test]
fn move_tool_drags_and_records() {
    let mut canvas = white_canvas(500, 500);
    draw_rectangle(&mut canvas);
    canvas.set_tool(ToolKind::Move);

    let outcome = drag(
        &mut canvas,
        &[pos2(100.0, 100.0), pos2(120.0, 110.0), pos2(130.0, 120.0)],
    );
    assert_eq!(outcome, EventOutcome::Committed);
    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.position(), pos2(80.0, 70.0));
    assert!(shape.is_selected());
    assert_eq!(canvas.cursor(), CursorHint::OpenHand);
    assert_eq!(canvas.history().len(), 3);

    assert!(canvas.undo());
    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.position(), pos2(50.0, 50.0));
}

#[test]
fn escape_puts_dragged_shape_back() {
    let mut canvas = white_canvas(500, 500);
    draw_rectangle(&mut canvas);
    canvas.set_tool(ToolKind::Move);

    press(&mut canvas, pos2(100.0, 100.0), PointerButton::Primary, InputModifiers::NONE);
    canvas.handle_event(&InputEvent::pointer_move(pos2(200.0, 200.0), InputModifiers::NONE));
    let outcome = canvas.handle_event(&InputEvent::key_down(Key::Escape, InputModifiers::NONE));
    assert_eq!(outcome, EventOutcome::Handled);
    let released = release(&mut canvas, pos2(200.0, 200.0), PointerButton::Primary, InputModifiers::NONE);
    assert_eq!(released, EventOutcome::Ignored);

    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.position(), pos2(50.0, 50.0));
    assert_eq!(canvas.history().len(), 2);
}

#[test]
fn rubber_band_selects_and_delete_removes() {
    let mut canvas = white_canvas(500, 500);
    draw_rectangle(&mut canvas);
    canvas.set_tool(ToolKind::Move);

    let outcome = drag(&mut canvas, &[pos2(300.0, 300.0), pos2(20.0, 20.0)]);
    assert_eq!(outcome, EventOutcome::Handled);
    let document = canvas.document().expect("document");
    assert!(document.shapes()[0].is_selected());
    assert!(document.preview().is_none());

    let outcome = canvas.handle_event(&InputEvent::key_down(Key::Delete, InputModifiers::NONE));
    assert_eq!(outcome, EventOutcome::Committed);
    assert!(canvas.document().expect("document").shapes().is_empty());
    assert_eq!(canvas.history().len(), 3);
}

#[test]
fn leaving_the_move_tool_clears_selection() {
    let mut canvas = white_canvas(500, 500);
    draw_rectangle(&mut canvas);
    canvas.set_tool(ToolKind::Move);
    click(&mut canvas, pos2(100.0, 100.0), PointerButton::Primary);
    assert!(canvas.document().expect("document").shapes()[0].is_selected());

    canvas.set_tool(ToolKind::Brush);
    let shape = &canvas.document().expect("document").shapes()[0];
    assert!(!shape.is_selected());
    assert!(!shape.is_draggable());
}

#[test]
fn zoom_tool_clicks_zoom_around_the_pointer() {
    let mut canvas = white_canvas(500, 500);
    canvas.set_tool(ToolKind::Zoom);
    let anchor = pos2(100.0, 100.0);

    click(&mut canvas, anchor, PointerButton::Primary);
    assert!((canvas.viewport().zoom() - 1.2).abs() < 1e-5);
    let fixed = canvas.viewport().to_image_space(anchor);
    assert!((fixed - anchor).length() < 1e-3);

    click(&mut canvas, anchor, PointerButton::Secondary);
    assert!((canvas.viewport().zoom() - 1.0).abs() < 1e-5);
}

#[test]
fn zoom_stays_within_bounds() {
    let mut canvas = white_canvas(100, 100);
    for _ in 0..200 {
        canvas.handle_event(&InputEvent::Scroll {
            pos: pos2(10.0, 10.0),
            delta_y: 1.0,
            modifiers: InputModifiers::NONE,
        });
    }
    let max = canvas.config().zoom.max_zoom;
    assert!(canvas.viewport().zoom() <= max);
    assert!(canvas.viewport().zoom() > max / 1.15);
    assert!(!canvas.zoom_at(pos2(0.0, 0.0), 1.15));

    canvas.reset_zoom();
    assert_eq!(canvas.viewport().zoom(), 1.0);
    assert!(!canvas.zoom_at(pos2(0.0, 0.0), 0.0001));
}

#[test]
fn space_pans_and_restores_the_tool() {
    let mut canvas = Canvas::default();
    canvas.set_view_size(vec2(500.0, 500.0));
    canvas.open_image(blank_raster(500, 500, Color32::WHITE));
    canvas.set_tool(ToolKind::Rectangle);

    canvas.handle_event(&InputEvent::key_down(Key::Space, InputModifiers::NONE));
    assert_eq!(canvas.cursor(), CursorHint::OpenHand);
    press(&mut canvas, pos2(250.0, 250.0), PointerButton::Primary, InputModifiers::NONE);
    assert_eq!(canvas.cursor(), CursorHint::ClosedHand);
    canvas.handle_event(&InputEvent::pointer_move(pos2(350.0, 250.0), InputModifiers::NONE));
    release(&mut canvas, pos2(350.0, 250.0), PointerButton::Primary, InputModifiers::NONE);
    canvas.handle_event(&InputEvent::key_up(Key::Space, InputModifiers::NONE));

    // The pan is clamped to the scene around the image
    let center = canvas.viewport().view_center_in_image();
    assert!((center.x - 225.0).abs() < 1e-3);
    assert!((center.y - 250.0).abs() < 1e-3);
    assert_eq!(canvas.tool(), ToolKind::Rectangle);
    assert_eq!(canvas.cursor(), CursorHint::Crosshair);
    assert!(canvas.document().expect("document").shapes().is_empty());
}

#[test]
fn paste_centers_clipboard_image_in_view() {
    let clipboard = StaticClipboard::new(blank_raster(10, 10, Color32::RED));
    let mut canvas = Canvas::default().with_clipboard(Box::new(clipboard));
    canvas.set_view_size(vec2(500.0, 500.0));
    canvas.open_image(blank_raster(500, 500, Color32::WHITE));

    assert_eq!(ctrl_key(&mut canvas, Key::V), EventOutcome::Committed);
    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.kind_name(), "image");
    assert_eq!(shape.position(), pos2(245.0, 245.0));
    assert_eq!(pixel(&canvas, 250, 250), Rgb([255, 0, 0]));
    assert_eq!(canvas.history().len(), 2);
}

#[test]
fn paste_without_clipboard_image_is_abandoned() {
    let mut canvas = white_canvas(50, 50).with_clipboard(Box::new(StaticClipboard::default()));
    assert_eq!(
        ctrl_key(&mut canvas, Key::V),
        EventOutcome::Abandoned(EditorError::ClipboardEmpty)
    );
    assert!(canvas.document().expect("document").shapes().is_empty());
}

#[test]
fn text_tool_requests_and_submits_text() {
    let mut canvas = white_canvas(200, 200);
    let log = EventLog::new();
    canvas.subscribe(Box::new(log.clone()));
    canvas.set_tool(ToolKind::Text);

    click(&mut canvas, pos2(20.0, 30.0), PointerButton::Primary);
    assert!(log.events().contains(&CanvasEvent::TextRequested {
        position: pos2(20.0, 30.0)
    }));
    assert_eq!(canvas.pending_text(), Some(pos2(20.0, 30.0)));

    canvas.submit_text("Hello").expect("text added");
    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.kind_name(), "text");
    assert_eq!(shape.position(), pos2(20.0, 30.0));
    assert_eq!(canvas.history().len(), 2);
    assert_eq!(canvas.submit_text("again"), Err(EditorError::NoPendingText));
}

#[test]
fn pixmap_tool_needs_a_pixmap() {
    let mut canvas = white_canvas(100, 100);
    canvas.set_tool(ToolKind::Pixmap);
    let outcome = press(&mut canvas, pos2(10.0, 10.0), PointerButton::Primary, InputModifiers::NONE);
    assert_eq!(outcome, EventOutcome::Abandoned(EditorError::NoPixmap));
    release(&mut canvas, pos2(10.0, 10.0), PointerButton::Primary, InputModifiers::NONE);

    canvas.set_pixmap(Some(blank_raster(4, 4, Color32::BLUE)));
    assert_eq!(click(&mut canvas, pos2(10.0, 10.0), PointerButton::Primary), EventOutcome::Committed);
    let shape = &canvas.document().expect("document").shapes()[0];
    assert_eq!(shape.position(), pos2(10.0, 10.0));
    assert_eq!(canvas.history().len(), 1);
}

#[test]
fn release_without_press_is_rejected() {
    let mut canvas = white_canvas(50, 50);
    let outcome = release(&mut canvas, pos2(5.0, 5.0), PointerButton::Primary, InputModifiers::NONE);
    assert_eq!(outcome, EventOutcome::Abandoned(EditorError::UnmatchedRelease));
}

#[test]
fn events_without_image_are_ignored() {
    let mut canvas = Canvas::default();
    assert_eq!(
        click(&mut canvas, pos2(5.0, 5.0), PointerButton::Primary),
        EventOutcome::Ignored
    );
    assert!(!canvas.undo());
    assert_eq!(canvas.flatten_to_image(), Err(EditorError::NoImage));
}

#[test]
fn middle_button_is_ignored() {
    let mut canvas = white_canvas(50, 50);
    canvas.set_tool(ToolKind::Rectangle);
    let outcome = press(&mut canvas, pos2(5.0, 5.0), PointerButton::Middle, InputModifiers::NONE);
    assert_eq!(outcome, EventOutcome::Ignored);
    assert!(canvas.gesture().is_idle());
}

#[test]
fn tool_switch_cancels_the_gesture() {
    let mut canvas = white_canvas(100, 100);
    canvas.set_tool(ToolKind::Line);
    press(&mut canvas, pos2(10.0, 10.0), PointerButton::Primary, InputModifiers::NONE);
    canvas.handle_event(&InputEvent::pointer_move(pos2(60.0, 60.0), InputModifiers::NONE));

    canvas.set_tool(ToolKind::Ellipse);
    assert!(canvas.gesture().is_idle());
    let document = canvas.document().expect("document");
    assert!(document.preview().is_none());
    assert!(document.shapes().is_empty());
}
