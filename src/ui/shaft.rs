//! Side view of the shaft with the car drawn at its current position.

use egui::{
    Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2,
};

use super::common::{status_color, UiColors};
use crate::elevator::{ElevatorStatus, FLOOR_COUNT};

const CAR_TRAVEL_SECS: f32 = 0.8;

/// Vertical centre of `floor` inside `shaft`, floor 1 at the bottom.
pub fn floor_center_y(shaft: Rect, floor: f32) -> f32 {
    let level_height = shaft.height() / FLOOR_COUNT as f32;
    shaft.bottom() - (floor - 0.5) * level_height
}

fn landing_color(floor: u32, status: &ElevatorStatus) -> Color32 {
    if floor == status.target_floor && status.state.is_moving() {
        UiColors::MOVING
    } else if floor == status.floor {
        UiColors::ACTIVE
    } else {
        UiColors::BORDER
    }
}

pub fn render(ui: &mut Ui, status: &ElevatorStatus) {
    let height = ui.available_height().clamp(180.0, 420.0);
    let (response, painter) = ui.allocate_painter(Vec2::new(160.0, height), Sense::hover());
    let outer = response.rect;
    let shaft = Rect::from_min_max(
        Pos2::new(outer.left() + 40.0, outer.top() + 4.0),
        Pos2::new(outer.right() - 8.0, outer.bottom() - 4.0),
    );

    painter.rect_filled(shaft, CornerRadius::same(2), UiColors::EXTREME_BG);
    painter.rect_stroke(
        shaft,
        CornerRadius::same(2),
        Stroke::new(1.0, UiColors::BORDER),
        StrokeKind::Inside,
    );

    let level_height = shaft.height() / FLOOR_COUNT as f32;
    for floor in 1..=FLOOR_COUNT {
        let y = floor_center_y(shaft, floor as f32);
        let slab = shaft.bottom() - (floor - 1) as f32 * level_height;
        painter.line_segment(
            [Pos2::new(shaft.left(), slab), Pos2::new(shaft.right(), slab)],
            Stroke::new(1.0, UiColors::BORDER),
        );
        painter.text(
            Pos2::new(outer.left() + 16.0, y),
            Align2::CENTER_CENTER,
            floor.to_string(),
            FontId::proportional(18.0),
            landing_color(floor, status),
        );
    }

    // Animated towards the reported floor.
    let car_floor = ui.ctx().animate_value_with_time(
        egui::Id::new("elevator_car_floor"),
        status.floor as f32,
        CAR_TRAVEL_SECS,
    );
    let car_size = Vec2::new(shaft.width() - 16.0, level_height - 12.0);
    let car = Rect::from_center_size(
        Pos2::new(shaft.center().x, floor_center_y(shaft, car_floor)),
        car_size,
    );
    painter.rect_filled(car, CornerRadius::same(4), UiColors::MAIN_BG);
    painter.rect_stroke(
        car,
        CornerRadius::same(4),
        Stroke::new(2.0, status_color(status)),
        StrokeKind::Inside,
    );

    // Door leaves slide apart when open.
    let gap = if status.door_open() { car.width() * 0.3 } else { 0.0 };
    let leaf_width = (car.width() - 8.0 - gap) / 2.0;
    let door_top = car.top() + 4.0;
    let door_bottom = car.bottom() - 4.0;
    let left_leaf = Rect::from_min_max(
        Pos2::new(car.left() + 4.0, door_top),
        Pos2::new(car.left() + 4.0 + leaf_width, door_bottom),
    );
    let right_leaf = Rect::from_min_max(
        Pos2::new(car.right() - 4.0 - leaf_width, door_top),
        Pos2::new(car.right() - 4.0, door_bottom),
    );
    let door_fill = if status.door_obstructed {
        UiColors::WARNING
    } else {
        UiColors::BORDER
    };
    painter.rect_filled(left_leaf, CornerRadius::same(1), door_fill);
    painter.rect_filled(right_leaf, CornerRadius::same(1), door_fill);

    if status.overload {
        painter.text(
            car.center_top() + Vec2::new(0.0, -2.0),
            Align2::CENTER_BOTTOM,
            "OVERLOAD",
            FontId::proportional(11.0),
            UiColors::INACTIVE,
        );
    }
}
