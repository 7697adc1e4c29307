mod parser;

use std::io::Read;
use std::path::Path;

use crate::engine::{ProfileError, StudentProfile};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Profile {
        row: usize,
        student_id: String,
        source: ProfileError,
    },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::Profile {
                row,
                student_id,
                source,
            } => {
                write!(
                    f,
                    "roster row {} (student '{}') failed validation: {}",
                    row, student_id, source
                )
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::Profile { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Bulk-loads student profiles from an advising-office CSV export.
///
/// Imports are all-or-nothing: the first invalid row rejects the whole
/// batch, so a half-loaded roster never reaches the profile store.
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StudentProfile>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<StudentProfile>, RosterImportError> {
        let profiles = parser::parse_records(reader)?;

        for (index, profile) in profiles.iter().enumerate() {
            profile.validate().map_err(|source| {
                // Row numbers are 1-based and skip the header line.
                RosterImportError::Profile {
                    row: index + 2,
                    student_id: profile.id.0.clone(),
                    source,
                }
            })?;
        }

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Student ID,Current CGPA,Attendance %,Previous Backlogs,Mental Health Score,Study Hours Per Day,Year of Study,Family Income,Extracurricular Activities";

    fn roster(rows: &[&str]) -> String {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        csv
    }

    #[test]
    fn importer_reads_complete_rows() {
        let csv = roster(&["stu-1,8.2,91,0,7.5,4,2,45000,Debate; Chess Club"]);
        let profiles = RosterImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.id.0, "stu-1");
        assert_eq!(profile.current_cgpa, Some(8.2));
        assert_eq!(profile.previous_backlogs, Some(0));
        assert_eq!(profile.year_of_study, 2);
        assert_eq!(
            profile.extracurricular_activities,
            vec!["Debate".to_string(), "Chess Club".to_string()]
        );
    }

    #[test]
    fn blank_cells_become_unknown_signals() {
        let csv = roster(&["stu-2,,,,,,3,,"]);
        let profiles = RosterImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        let profile = &profiles[0];
        assert!(profile.current_cgpa.is_none());
        assert!(profile.attendance_percentage.is_none());
        assert!(profile.previous_backlogs.is_none());
        assert!(profile.mental_health_score.is_none());
        assert!(profile.family_income.is_none());
        assert!(profile.extracurricular_activities.is_empty());
    }

    #[test]
    fn invalid_row_rejects_the_whole_batch() {
        let csv = roster(&[
            "stu-1,8.2,91,0,7.5,4,2,45000,",
            "stu-2,11.0,91,0,7.5,4,2,45000,",
        ]);
        let error =
            RosterImporter::from_reader(Cursor::new(csv)).expect_err("out-of-range CGPA rejected");

        match error {
            RosterImportError::Profile {
                row, student_id, ..
            } => {
                assert_eq!(row, 3);
                assert_eq!(student_id, "stu-2");
            }
            other => panic!("expected profile error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_is_a_csv_error() {
        let csv = roster(&["stu-1,not-a-number,91,0,7.5,4,2,45000,"]);
        let error = RosterImporter::from_reader(Cursor::new(csv)).expect_err("bad cell rejected");

        match error {
            RosterImportError::Csv(_) => {}
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error =
            RosterImporter::from_path("./does-not-exist.csv").expect_err("expected io error");

        match error {
            RosterImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
