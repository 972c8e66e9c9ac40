//! JSON report writer

use std::fs;
use std::path::Path;

use tracing::info;

use crate::cohorts::Cohorts;
use crate::error::StatsError;

/// Render the report as a JSON string.
pub fn render(cohorts: &Cohorts, indent: bool) -> Result<String, StatsError> {
    let json = if indent {
        serde_json::to_string_pretty(cohorts)?
    } else {
        serde_json::to_string(cohorts)?
    };
    Ok(json)
}

/// Write the report to `path`, creating parent directories as needed.
pub fn write_report(cohorts: &Cohorts, path: &Path, indent: bool) -> Result<(), StatsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut json = render(cohorts, indent)?;
    json.push('\n');
    fs::write(path, json)?;

    info!(path = %path.display(), games = cohorts.all.total, "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_stats::extractor::OpeningTries;

    #[test]
    fn test_write_and_read_back() {
        let dir = std::env::temp_dir().join(format!("pgn-stats-output-{}", std::process::id()));
        let path = dir.join("nested").join("report-allgames.json");
        let cohorts = Cohorts::new(&OpeningTries::new(false));

        write_report(&cohorts, &path, true).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim_end(), render(&cohorts, true).unwrap());

        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["total"], 0);
        assert_eq!(value["heatmaps"]["squareUtilization"].as_array().unwrap().len(), 64);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_indent_only_changes_whitespace() {
        let cohorts = Cohorts::new(&OpeningTries::new(true));
        let compact: serde_json::Value =
            serde_json::from_str(&render(&cohorts, false).unwrap()).unwrap();
        let pretty: serde_json::Value =
            serde_json::from_str(&render(&cohorts, true).unwrap()).unwrap();
        assert_eq!(compact, pretty);
        assert!(!render(&cohorts, false).unwrap().contains('\n'));
    }
}
