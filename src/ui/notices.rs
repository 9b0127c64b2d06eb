use egui::{RichText, Ui};

use super::common::{create_frame, UiColors};
use crate::store::{DashboardStore, Notice, NoticeLevel};

/// Notices newer than this are shown in the strip.
const NOTICE_LIFETIME_MS: i64 = 6_000;
const MAX_VISIBLE: usize = 3;

/// The notices still worth showing at `now_ms`, newest first.
pub fn visible<'a>(notices: impl Iterator<Item = &'a Notice>, now_ms: i64) -> Vec<&'a Notice> {
    notices
        .filter(|notice| now_ms - notice.timestamp < NOTICE_LIFETIME_MS)
        .take(MAX_VISIBLE)
        .collect()
}

pub fn render<'a>(ui: &mut Ui, notices: impl Iterator<Item = &'a Notice>, store: &DashboardStore) {
    let now = chrono::Utc::now().timestamp_millis();
    let shown = visible(notices, now);
    if shown.is_empty() {
        return;
    }

    ui.horizontal_wrapped(|ui| {
        for notice in shown {
            let color = match notice.level {
                NoticeLevel::Info => UiColors::ACTIVE,
                NoticeLevel::Error => UiColors::INACTIVE,
            };
            create_frame(UiColors::EXTREME_BG, color).show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(&notice.title).strong().color(color));
                    ui.label(&notice.description);
                });
            });
        }
        if ui.small_button("Dismiss").clicked() {
            store.dismiss_notices();
        }
    });
}
