use std::sync::Arc;

use canvas_paint::element::{
    Draggable, begin_drag, cancel_drag, cursor_hint, disable_dragging, drag_to, enable_dragging,
    factory, finish_drag, set_selected,
};
use canvas_paint::history::ShapeRecord;
use canvas_paint::io::blank_raster;
use canvas_paint::style::{Fill, FontSpec, Pen};
use canvas_paint::{CursorHint, ShapeItem, ShapeKind};
use egui::{Color32, Pos2, Rect, pos2, vec2};

fn test_rectangle() -> ShapeItem {
    factory::rectangle(
        Rect::from_min_max(pos2(10.0, 20.0), pos2(110.0, 70.0)),
        Pen::new(Color32::RED, 4.0),
        Fill::none(),
    )
}

fn test_image() -> ShapeItem {
    let pixels = Arc::new(blank_raster(100, 50, Color32::GREEN));
    factory::image(pixels, pos2(10.0, 20.0))
}

#[test]
fn test_element_creation() {
    let rectangle = test_rectangle();
    assert_eq!(rectangle.kind_name(), "rectangle");
    assert_eq!(rectangle.position(), pos2(10.0, 20.0));

    let image = test_image();
    assert_eq!(image.kind_name(), "image");
    assert_ne!(rectangle.id(), image.id());
}

#[test]
fn test_element_rect() {
    // Outline half width is included
    let rectangle = test_rectangle();
    assert_eq!(
        rectangle.bounding_box(),
        Rect::from_min_max(pos2(8.0, 18.0), pos2(112.0, 72.0))
    );

    let image = test_image();
    assert_eq!(
        image.bounding_box(),
        Rect::from_min_size(pos2(10.0, 20.0), vec2(100.0, 50.0))
    );
}

#[test]
fn test_element_hit_test() {
    let rectangle = test_rectangle();
    assert!(rectangle.hit_test(pos2(10.0, 40.0)));
    assert!(rectangle.hit_test(pos2(60.0, 40.0)));
    assert!(!rectangle.hit_test(pos2(200.0, 40.0)));

    let line = factory::line(pos2(0.0, 0.0), pos2(100.0, 0.0), Pen::new(Color32::BLACK, 1.0));
    assert!(line.hit_test(pos2(50.0, 2.0)));
    assert!(!line.hit_test(pos2(50.0, 10.0)));
}

#[test]
fn test_element_translation() {
    let mut image = test_image();
    image.translate(vec2(5.0, -5.0));
    assert_eq!(image.position(), pos2(15.0, 15.0));
    assert_eq!(image.bounding_box().min, pos2(15.0, 15.0));
}

#[test]
fn test_polygon_and_path_factories() {
    let pen = Pen::default();
    assert!(factory::polygon(&[pos2(0.0, 0.0), pos2(5.0, 5.0)], pen, Fill::none()).is_none());

    let polygon = factory::polygon(
        &[pos2(10.0, 10.0), pos2(40.0, 10.0), pos2(20.0, 30.0)],
        pen,
        Fill::solid(Color32::BLUE),
    )
    .expect("three points");
    assert_eq!(polygon.position(), pos2(10.0, 10.0));
    assert!(polygon.hit_test(pos2(22.0, 15.0)));
    match polygon.kind() {
        ShapeKind::Polygon(shape) => assert_eq!(shape.points[1], pos2(30.0, 0.0)),
        other => panic!("expected polygon, got {other:?}"),
    }

    assert!(factory::path(&[], pen).is_none());
}

#[test]
fn test_text_has_extent() {
    let text = factory::text("Hello", FontSpec::default(), Color32::BLACK, pos2(5.0, 5.0));
    let bounds = text.bounding_box();
    assert_eq!(bounds.min, pos2(5.0, 5.0));
    assert!(bounds.width() > 0.0);
    assert!(bounds.height() > 0.0);
    assert!(text.pen().is_none());
}

#[test]
fn test_drag_lifecycle() {
    let mut item = test_rectangle();
    // Shapes start out locked
    assert!(begin_drag(&mut item).is_none());
    set_selected(&mut item, true);
    assert!(!item.is_selected());

    enable_dragging(&mut item);
    set_selected(&mut item, true);
    assert_eq!(begin_drag(&mut item), Some(CursorHint::ClosedHand));
    assert_eq!(cursor_hint(&item, true), CursorHint::ClosedHand);

    drag_to(&mut item, vec2(10.0, 10.0));
    drag_to(&mut item, vec2(30.0, 5.0));
    assert_eq!(item.position(), pos2(40.0, 25.0));
    assert_eq!(finish_drag(&mut item), Some(vec2(30.0, 5.0)));
    assert!(!item.drag_state().is_dragging());
    assert_eq!(cursor_hint(&item, true), CursorHint::OpenHand);
}

#[test]
fn test_cancelled_drag_returns_home() {
    let mut item = test_image();
    enable_dragging(&mut item);
    set_selected(&mut item, true);
    begin_drag(&mut item);
    drag_to(&mut item, vec2(100.0, 100.0));
    cancel_drag(&mut item);
    assert_eq!(item.position(), pos2(10.0, 20.0));
    assert_eq!(finish_drag(&mut item), None);

    disable_dragging(&mut item);
    assert!(!item.is_selected());
    assert_eq!(cursor_hint(&item, true), CursorHint::PointingHand);
    assert_eq!(cursor_hint(&item, false), CursorHint::Arrow);
}

#[test]
fn test_records_restore_tracked_shapes() {
    let mut rectangle = test_rectangle();
    rectangle.set_position(Pos2::new(3.0, 4.0));
    let record = ShapeRecord::capture(&rectangle).expect("rectangles are tracked");
    assert_eq!(record.id(), rectangle.id());
    assert_eq!(record.restore(), rectangle);

    let json = serde_json::to_string(&record).expect("serializes");
    assert!(json.contains(r#""type":"Rectangle""#));
    let parsed: ShapeRecord = serde_json::from_str(&json).expect("parses");
    assert_eq!(parsed, record);

    assert!(ShapeRecord::capture(&test_image()).is_none());
}
