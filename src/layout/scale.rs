use crate::ir::{PlacementError, ScaleBand};

// Vertical calibration of the diagram bands on the fixed-height canvas.
// These are the anchor y values the plan band interpolates between.

/// y of the `text` band.
pub const TEXT_Y: f32 = 165.0;
/// y of the `concept` band.
pub const CONCEPT_Y: f32 = 515.0;
/// y of the `blueprints` band.
pub const BLUEPRINTS_Y: f32 = 1870.0;
/// Top edge of the plan band (anchor for plan number 0).
pub const PLAN_BAND_MIN: f32 = 700.0;
/// Bottom edge of the plan band; anchors the slope past 1:100000.
pub const PLAN_BAND_MAX: f32 = 1600.0;
/// y anchor for a 1:1000 plan.
pub const PLAN_1000_Y: f32 = 1455.0;
/// y anchor for a 1:5000 plan.
pub const PLAN_5000_Y: f32 = 1280.0;
/// y anchor for a 1:10000 plan.
pub const PLAN_10000_Y: f32 = 980.0;
/// y anchor for a 1:100000 plan.
pub const PLAN_100000_Y: f32 = 805.0;

/// Maps a document classification to its vertical position.
///
/// The three fixed bands return their constant anchor. A plan scale
/// interpolates linearly between consecutive anchors of its plan number;
/// past 1:100000 the line keeps the `PLAN_BAND_MAX` slope with no upper
/// clamp, so very large denominators can leave the nominal band.
pub fn scale_to_y(scale: ScaleBand, plan_number: Option<u32>) -> Result<f32, PlacementError> {
    match scale {
        ScaleBand::Text => reject_plan_number(scale, plan_number, TEXT_Y),
        ScaleBand::Concept => reject_plan_number(scale, plan_number, CONCEPT_Y),
        ScaleBand::Blueprints => reject_plan_number(scale, plan_number, BLUEPRINTS_Y),
        ScaleBand::Plan => {
            let n = match plan_number {
                Some(n) if n > 0 => n as f32,
                other => {
                    return Err(PlacementError::InvalidPlanNumber {
                        scale,
                        plan_number: other.map(i64::from),
                    });
                }
            };
            Ok(plan_y(n))
        }
    }
}

fn reject_plan_number(
    scale: ScaleBand,
    plan_number: Option<u32>,
    y: f32,
) -> Result<f32, PlacementError> {
    match plan_number {
        None => Ok(y),
        Some(n) => Err(PlacementError::InvalidPlanNumber {
            scale,
            plan_number: Some(i64::from(n)),
        }),
    }
}

fn plan_y(n: f32) -> f32 {
    if n < 1000.0 {
        PLAN_BAND_MIN + (PLAN_1000_Y - PLAN_BAND_MIN) / 1000.0 * n
    } else if n < 5000.0 {
        PLAN_1000_Y + (PLAN_5000_Y - PLAN_1000_Y) / 4000.0 * (n - 1000.0)
    } else if n < 10000.0 {
        PLAN_5000_Y + (PLAN_10000_Y - PLAN_5000_Y) / 5000.0 * (n - 5000.0)
    } else if n < 100000.0 {
        PLAN_10000_Y + (PLAN_100000_Y - PLAN_10000_Y) / 90000.0 * (n - 10000.0)
    } else {
        PLAN_100000_Y + (PLAN_BAND_MAX - PLAN_100000_Y) / 100000.0 * (n - 100000.0)
    }
}
