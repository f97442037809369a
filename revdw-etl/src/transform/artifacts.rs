//! Intermediate CSV snapshots
//!
//! Written between the transform and load stages for inspection:
//! `author_dim.csv`, `flight_dim.csv` and `review_fact.csv`.

use std::path::{Path, PathBuf};

use revdw_common::{Error, Result};
use serde::Serialize;
use tracing::{error, info};

use super::LoadPlan;

/// Files written by [`save_intermediate_data`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub author_dim: PathBuf,
    pub flight_dim: PathBuf,
    pub review_fact: PathBuf,
}

/// Write one CSV file per plan structure into `output_folder`
pub fn save_intermediate_data(plan: &LoadPlan, output_folder: &Path) -> Result<ArtifactPaths> {
    info!("Saving intermediate data to {}", output_folder.display());
    std::fs::create_dir_all(output_folder).map_err(|e| {
        error!("Error creating {}: {}", output_folder.display(), e);
        Error::Artifact(format!("{}: {}", output_folder.display(), e))
    })?;

    let paths = ArtifactPaths {
        author_dim: output_folder.join("author_dim.csv"),
        flight_dim: output_folder.join("flight_dim.csv"),
        review_fact: output_folder.join("review_fact.csv"),
    };

    write_csv(&paths.author_dim, &plan.authors)?;
    write_csv(&paths.flight_dim, &plan.flights)?;
    write_csv(&paths.review_fact, &plan.facts)?;

    Ok(paths)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let result = (|| -> std::result::Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            info!("Saved {} records to {}", rows.len(), path.display());
            Ok(())
        }
        Err(e) => {
            error!("Error saving {}: {}", path.display(), e);
            Err(Error::Artifact(format!("{}: {}", path.display(), e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedRecord;
    use chrono::NaiveDate;

    fn record() -> NormalizedRecord {
        NormalizedRecord {
            author_name: "Jane, Doe".to_string(),
            author_location: "Kenya".to_string(),
            review_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            date_flown: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            review_title: "Fine".to_string(),
            review_text: "Quiet flight".to_string(),
            type_of_traveller: "Business".to_string(),
            seat_type: "Economy Class".to_string(),
            route: "NBO to ADD".to_string(),
            rating: 4.5,
            seat_comfort: 3,
            cabin_staff_service: 4,
            food_beverages: 2,
            inflight_entertainment: 1,
            ground_service: 5,
            value_for_money: 4,
            recommended_service: true,
        }
    }

    #[test]
    fn test_writes_three_files_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("output");
        let plan = LoadPlan::prepare(vec![record()]);

        let paths = save_intermediate_data(&plan, &folder).unwrap();

        let authors = std::fs::read_to_string(&paths.author_dim).unwrap();
        let mut lines = authors.lines();
        assert_eq!(
            lines.next(),
            Some("AuthorName,AuthorLocation,CreatedDate,IsActive")
        );
        assert!(lines.next().unwrap().starts_with("\"Jane, Doe\",Kenya,"));

        let flights = std::fs::read_to_string(&paths.flight_dim).unwrap();
        assert!(flights.starts_with("SeatType,Route,TypeOfTraveller,CreatedDate,IsCurrent"));

        let facts = std::fs::read_to_string(&paths.review_fact).unwrap();
        let header = facts.lines().next().unwrap();
        assert!(header.starts_with("AuthorName,AuthorLocation,ReviewDate,DateFlown,"));
        assert!(header.ends_with(",RecommendedService"));
        assert!(facts.contains("2023-03-01"));
    }

    #[test]
    fn test_unwritable_folder_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a folder").unwrap();

        let err = save_intermediate_data(&LoadPlan::default(), &blocker.join("output")).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)), "got {:?}", err);
        assert!(err.to_string().contains("output"));
    }
}
