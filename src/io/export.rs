//! Export the synthetic training set to CSV.
//!
//! One row per applicant: the seven model features in feature order, then the
//! ground-truth probability and the drawn label (0/1). Meant for inspection in
//! spreadsheets or downstream scripts; the scorer never reads it.

use std::io::{self, Write};
use std::path::Path;

use crate::data::SyntheticDataset;
use crate::domain::FEATURE_NAMES;
use crate::error::ArtifactError;
use crate::io::staging::StagedFiles;

/// Stage the dataset CSV for `path` into a batch.
pub fn stage_dataset_csv(
    staged: &mut StagedFiles,
    path: &Path,
    dataset: &SyntheticDataset,
) -> Result<(), ArtifactError> {
    staged.stage(path, |w| {
        write_dataset_csv(w, dataset).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Write the dataset as CSV to any writer.
pub fn write_dataset_csv<W: Write>(mut out: W, dataset: &SyntheticDataset) -> io::Result<()> {
    writeln!(out, "{},true_pd,default", FEATURE_NAMES.join(","))?;

    for a in &dataset.applicants {
        let r = &a.record;
        writeln!(
            out,
            "{:.2},{:.2},{:.2},{:.2},{},{:.6},{:.6},{:.6},{}",
            r.income_monthly,
            r.other_debt_monthly,
            r.housing_cost,
            r.principal,
            r.term_months,
            r.ltv,
            r.dti,
            a.true_pd,
            u8::from(a.default),
        )?;
    }

    Ok(())
}
