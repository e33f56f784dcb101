//! Angle table persistence.
//!
//! Tables are comma separated with a header row:
//! `frame,elbow_angle,spine_angle,knee_angle,shoulder_angle`. Labeled tables
//! add a trailing `risk_label` column holding `1` (risky) or `0`.

use crate::{
    classifier::is_risky_posture,
    constants::DEGENERATE_ANGLE,
    clip_analysis::{AngleSeries, SampledFrame},
    frame_analysis::FrameAngles,
    landmarks::AngleFamily,
    Error, Result,
};
use log::warn;
use std::io::{BufRead, Write};

/// Column holding the frame index
pub const FRAME_COLUMN: &str = "frame";

/// Column appended by [`write_labeled_csv`]
pub const RISK_LABEL_COLUMN: &str = "risk_label";

fn header_columns() -> Vec<&'static str> {
    let mut columns = vec![FRAME_COLUMN];
    columns.extend(AngleFamily::ALL.iter().map(|f| f.column_name()));
    columns
}

fn header() -> String {
    header_columns().join(",")
}

/// Leading columns must match exactly; trailing extras are allowed
fn is_valid_header(line: &str) -> bool {
    let expected = header_columns();
    let found: Vec<&str> = line.split(',').map(str::trim).collect();
    found.len() >= expected.len() && found.iter().zip(&expected).all(|(f, e)| f == e)
}

fn write_row<W: Write>(writer: &mut W, frame: &SampledFrame) -> Result<()> {
    let [elbow, spine, knee, shoulder] = frame.angles.to_array();
    write!(writer, "{},{elbow},{spine},{knee},{shoulder}", frame.frame_index)?;
    Ok(())
}

/// Write one row per sampled frame with a pose
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_angles_csv<W: Write>(series: &AngleSeries, mut writer: W) -> Result<()> {
    writeln!(writer, "{}", header())?;
    for frame in series.frames() {
        write_row(&mut writer, frame)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the angle table with a rule-based `risk_label` column
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_labeled_csv<W: Write>(series: &AngleSeries, mut writer: W) -> Result<()> {
    writeln!(writer, "{},{RISK_LABEL_COLUMN}", header())?;
    for frame in series.frames() {
        write_row(&mut writer, frame)?;
        writeln!(writer, ",{}", u8::from(is_risky_posture(&frame.angles)))?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, name: &str, line: usize) -> Result<T> {
    let raw = field.ok_or_else(|| Error::Parse {
        line,
        message: format!("missing column '{name}'"),
    })?;
    raw.trim().parse().map_err(|_| Error::Parse {
        line,
        message: format!("invalid value '{}' in column '{name}'", raw.trim()),
    })
}

/// Read an angle table written by [`write_angles_csv`] or
/// [`write_labeled_csv`]. Extra trailing columns are ignored.
///
/// Non-finite cells (`nan`, `inf`) stand for collapsed joints and read as
/// the degenerate 0° angle.
///
/// # Errors
///
/// Returns `Parse` for a wrong header, a short row, or a non-numeric value;
/// `Io` if reading fails.
pub fn read_angles_csv<R: BufRead>(reader: R) -> Result<AngleSeries> {
    let mut series = AngleSeries::new();
    let mut saw_header = false;

    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        if !saw_header {
            if !is_valid_header(&line) {
                return Err(Error::Parse {
                    line: line_number,
                    message: format!("expected header '{}'", header()),
                });
            }
            saw_header = true;
            continue;
        }

        let mut fields = line.split(',');
        let frame_index: usize = parse_field(fields.next(), FRAME_COLUMN, line_number)?;
        let mut values = [0.0f64; 4];
        for (slot, family) in values.iter_mut().zip(AngleFamily::ALL) {
            let value: f64 = parse_field(fields.next(), family.column_name(), line_number)?;
            *slot = if value.is_finite() {
                value
            } else {
                warn!(
                    "Line {line_number}: non-finite {} read as {DEGENERATE_ANGLE}°",
                    family.column_name()
                );
                DEGENERATE_ANGLE
            };
        }

        let [elbow, spine, knee, shoulder] = values;
        series.push(frame_index, Some(FrameAngles::new(elbow, spine, knee, shoulder)));
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_series() -> AngleSeries {
        let mut series = AngleSeries::new();
        series.push(5, Some(FrameAngles::new(160.5, 20.25, 150.0, 100.0)));
        series.push(10, None);
        series.push(15, Some(FrameAngles::new(140.0, 85.0, 95.0, 155.0)));
        series
    }

    #[test]
    fn test_write_angles_csv() {
        let mut out = Vec::new();
        write_angles_csv(&sample_series(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "frame,elbow_angle,spine_angle,knee_angle,shoulder_angle\n5,160.5,20.25,150,100\n15,140,85,95,155\n"
        );
    }

    #[test]
    fn test_labeled_csv() {
        let mut out = Vec::new();
        write_labeled_csv(&sample_series(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with(",risk_label"));
        assert!(lines[1].ends_with(",0"));
        assert!(lines[2].ends_with(",1"));

        // Labeled tables read back with the label ignored
        let series = read_angles_csv(Cursor::new(text)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_read_preserves_order() {
        let mut out = Vec::new();
        write_angles_csv(&sample_series(), &mut out).unwrap();
        let series = read_angles_csv(Cursor::new(out)).unwrap();

        let indices: Vec<usize> = series.frames().iter().map(|f| f.frame_index).collect();
        assert_eq!(indices, vec![5, 15]);
        assert_eq!(series.frames()[0].angles.spine_lean, 20.25);
    }

    #[test]
    fn test_read_rejects_bad_rows() {
        let missing_header = "5,1,2,3,4\n";
        assert!(matches!(
            read_angles_csv(Cursor::new(missing_header)),
            Err(Error::Parse { line: 1, .. })
        ));

        let short_row = "frame,elbow_angle,spine_angle,knee_angle,shoulder_angle\n5,1,2\n";
        match read_angles_csv(Cursor::new(short_row)) {
            Err(Error::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("knee_angle"));
            }
            other => panic!("Expected parse error, got {other:?}"),
        }

        let text_cell = "frame,elbow_angle,spine_angle,knee_angle,shoulder_angle\n5,1,two,3,4\n";
        assert!(matches!(
            read_angles_csv(Cursor::new(text_cell)),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_rejects_mangled_header() {
        for header in [
            "frame,elbow_angle,spine_angle,knee_angle,shoulder_angleXYZ\n",
            "frame,elbow_angle,spine_angle,knee_angle\n",
            "frame,elbow_angle,knee_angle,spine_angle,shoulder_angle\n",
        ] {
            assert!(
                matches!(read_angles_csv(Cursor::new(header)), Err(Error::Parse { line: 1, .. })),
                "Accepted header {header:?}"
            );
        }

        let padded = "frame, elbow_angle ,spine_angle,knee_angle,shoulder_angle,risk_label\n5,1,2,3,4,0\n";
        assert_eq!(read_angles_csv(Cursor::new(padded)).unwrap().len(), 1);
    }

    #[test]
    fn test_non_finite_cells_read_as_degenerate_angle() {
        let table = "frame,elbow_angle,spine_angle,knee_angle,shoulder_angle\n5,nan,20,NaN,inf\n10,170,20,160,100\n";
        let series = read_angles_csv(Cursor::new(table)).unwrap();
        assert_eq!(series.len(), 2);

        let first = series.frames()[0].angles;
        assert_eq!(first.to_array(), [0.0, 20.0, 0.0, 0.0]);
        assert_eq!(series.frames()[1].angles.elbow, 170.0);
    }

    #[test]
    fn test_read_empty_table() {
        let series = read_angles_csv(Cursor::new("frame,elbow_angle,spine_angle,knee_angle,shoulder_angle\n")).unwrap();
        assert!(series.is_empty());
    }
}
