//! Confusion-matrix artifacts: raw JSON plus an annotated PNG heatmap.
//!
//! The heatmap draws one shaded cell per matrix entry (white for zero,
//! saturated blue for the maximum count, so the diagonal stands out on
//! a well-behaved model), annotates each cell with its integer count,
//! and labels both axes with the class names (x = predicted, y = true).

use bof_core::{ConfusionMatrix, Error, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::fs;
use std::path::Path;
use tracing::debug;

const CELL_SIZE: u32 = 56;
const MARGIN_LEFT: u32 = 130;
const MARGIN_TOP: u32 = 60;
const MARGIN_RIGHT: u32 = 40;
const MARGIN_BOTTOM: u32 = 96;

/// Writes `confusion_matrix.json` and `confusion_matrix.png` under
/// `save_dir`, creating the directory if needed.
///
/// `labels` must have exactly one name per matrix row; a mismatch is a
/// validation error rather than a silently mislabeled plot.
pub fn save_confusion_matrix(
    matrix: &ConfusionMatrix,
    labels: &[String],
    save_dir: &Path,
) -> Result<()> {
    if matrix.dim() == 0 {
        return Err(Error::InvalidArgument(
            "confusion matrix is empty".to_string(),
        ));
    }
    if labels.len() != matrix.dim() {
        return Err(Error::InvalidArgument(format!(
            "{} labels provided for a {}x{} confusion matrix",
            labels.len(),
            matrix.dim(),
            matrix.dim()
        )));
    }

    fs::create_dir_all(save_dir).map_err(Error::Io)?;

    let json_path = save_dir.join("confusion_matrix.json");
    let payload = serde_json::json!({ "confusion_matrix": matrix.counts() });
    fs::write(&json_path, serde_json::to_string(&payload)?).map_err(Error::Io)?;

    let png_path = save_dir.join("confusion_matrix.png");
    render_heatmap(matrix, labels, &png_path)?;

    println!("Confusion matrix saved as JSON: {}", json_path.display());
    println!("Confusion matrix plot saved as PNG: {}", png_path.display());

    Ok(())
}

fn render_heatmap(matrix: &ConfusionMatrix, labels: &[String], path: &Path) -> Result<()> {
    let n = matrix.dim() as u32;
    let width = MARGIN_LEFT + n * CELL_SIZE + MARGIN_RIGHT;
    let height = MARGIN_TOP + n * CELL_SIZE + MARGIN_BOTTOM;

    debug!("Rendering {}x{} heatmap to {}", n, n, path.display());

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let max_count = matrix
        .counts()
        .iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);

    let centered = Pos::new(HPos::Center, VPos::Center);
    let title_style = ("sans-serif", 22, FontStyle::Bold)
        .into_font()
        .color(&BLACK)
        .pos(centered);
    let label_style = ("sans-serif", 15).into_font().color(&BLACK).pos(centered);
    let right_aligned = ("sans-serif", 15)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));

    root.draw(&Text::new(
        "Confusion Matrix",
        ((width / 2) as i32, (MARGIN_TOP / 2) as i32),
        title_style,
    ))
    .map_err(render_err)?;

    // Cells with integer annotations; row 0 (true class 0) at the top.
    for (row, counts) in matrix.counts().iter().enumerate() {
        for (col, &count) in counts.iter().enumerate() {
            let x0 = (MARGIN_LEFT + col as u32 * CELL_SIZE) as i32;
            let y0 = (MARGIN_TOP + row as u32 * CELL_SIZE) as i32;
            let x1 = x0 + CELL_SIZE as i32;
            let y1 = y0 + CELL_SIZE as i32;

            let intensity = count as f64 / max_count as f64;
            root.draw(&Rectangle::new(
                [(x0, y0), (x1, y1)],
                blues(intensity).filled(),
            ))
            .map_err(render_err)?;
            root.draw(&Rectangle::new(
                [(x0, y0), (x1, y1)],
                WHITE.stroke_width(1),
            ))
            .map_err(render_err)?;

            let annotation_color = if intensity > 0.6 { WHITE } else { BLACK };
            let annotation = ("sans-serif", 16)
                .into_font()
                .color(&annotation_color)
                .pos(centered);
            root.draw(&Text::new(
                format!("{count}"),
                ((x0 + x1) / 2, (y0 + y1) / 2),
                annotation,
            ))
            .map_err(render_err)?;
        }
    }

    // Axis tick labels: x = predicted, y = true.
    for (index, label) in labels.iter().enumerate() {
        let center = (MARGIN_LEFT + index as u32 * CELL_SIZE + CELL_SIZE / 2) as i32;
        root.draw(&Text::new(
            label.clone(),
            (center, (MARGIN_TOP + n * CELL_SIZE + 18) as i32),
            label_style.clone(),
        ))
        .map_err(render_err)?;

        let middle = (MARGIN_TOP + index as u32 * CELL_SIZE + CELL_SIZE / 2) as i32;
        root.draw(&Text::new(
            label.clone(),
            ((MARGIN_LEFT - 10) as i32, middle),
            right_aligned.clone(),
        ))
        .map_err(render_err)?;
    }

    // Axis titles.
    root.draw(&Text::new(
        "Predicted Label",
        (
            (MARGIN_LEFT + n * CELL_SIZE / 2) as i32,
            (height - 30) as i32,
        ),
        label_style.clone(),
    ))
    .map_err(render_err)?;
    root.draw(&Text::new(
        "True Label",
        (34, (MARGIN_TOP / 2) as i32),
        label_style,
    ))
    .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// White-to-blue color ramp matching the "Blues" look.
fn blues(intensity: f64) -> RGBColor {
    let t = intensity.clamp(0.0, 1.0);
    let lerp = |from: u8, to: u8| (from as f64 + (to as f64 - from as f64) * t).round() as u8;
    RGBColor(lerp(247, 8), lerp(251, 48), lerp(255, 107))
}

fn render_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> ConfusionMatrix {
        ConfusionMatrix::from_counts(vec![vec![5, 1], vec![2, 7]]).unwrap()
    }

    fn sample_labels() -> Vec<String> {
        vec!["bird".to_string(), "forest".to_string()]
    }

    #[test]
    fn test_artifacts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let save_dir = dir.path().join("reports");

        save_confusion_matrix(&sample_matrix(), &sample_labels(), &save_dir).unwrap();

        let json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(save_dir.join("confusion_matrix.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json, serde_json::json!({"confusion_matrix": [[5, 1], [2, 7]]}));

        assert!(save_dir.join("confusion_matrix.png").exists());
    }

    #[test]
    fn test_label_count_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_confusion_matrix(
            &sample_matrix(),
            &["bird".to_string()],
            dir.path(),
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(!dir.path().join("confusion_matrix.json").exists());
    }

    #[test]
    fn test_empty_matrix_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let empty = ConfusionMatrix::new(0);
        let result = save_confusion_matrix(&empty, &[], dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_blues_ramp_endpoints() {
        assert_eq!(blues(0.0), RGBColor(247, 251, 255));
        assert_eq!(blues(1.0), RGBColor(8, 48, 107));
    }
}
