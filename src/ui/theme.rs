// CaseSleuth - ui/theme.rs
//
// Colour scheme and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Apply the configured light/dark visuals.
pub fn apply(ctx: &egui::Context, dark_mode: bool) {
    if dark_mode {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

/// Pinned records in the visualisation tab.
pub const PINNED: Color32 = Color32::from_rgb(59, 130, 246); // Blue 500

/// Status bar colours.
pub const STATUS_WARNING: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600
pub const STATUS_MUTED: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500

/// Layout constants.
pub const ROW_HEIGHT: f32 = 20.0;
pub const DIVIDER_HANDLE_HEIGHT: f32 = 6.0;
