use crate::error::{CaseLensError, Result};

pub fn launch_ui_url(base_url: &str, project: &str, launch_id: u64) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/ui/#{project}/launches/all/{launch_id}")
}

pub fn issue_browse_url(base_url: &str, key: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/browse/{key}")
}

/// Extracts the spreadsheet id from a `.../spreadsheets/d/<id>/edit` URL.
pub fn spreadsheet_id_from_url(sheet_url: &str) -> Result<String> {
    let mut segments = sheet_url.split('/');
    segments
        .by_ref()
        .find(|segment| *segment == "d")
        .and_then(|_| segments.next())
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| CaseLensError::Config(format!("Invalid spreadsheet URL: {sheet_url}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_ui_url() {
        let url = launch_ui_url("https://reportportal.example.com/", "prow", 393_167);
        assert_eq!(
            url,
            "https://reportportal.example.com/ui/#prow/launches/all/393167"
        );
    }

    #[test]
    fn test_issue_browse_url() {
        let url = issue_browse_url("https://issues.example.com", "OCPQE-101");
        assert_eq!(url, "https://issues.example.com/browse/OCPQE-101");
    }

    #[test]
    fn test_spreadsheet_id_from_edit_url() {
        let id = spreadsheet_id_from_url(
            "https://docs.google.com/spreadsheets/d/1AbC-dEf_123/edit#gid=0",
        )
        .unwrap();
        assert_eq!(id, "1AbC-dEf_123");
    }

    #[test]
    fn test_spreadsheet_id_without_trailing_path() {
        let id = spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/xyz").unwrap();
        assert_eq!(id, "xyz");
    }

    #[test]
    fn test_spreadsheet_url_without_id_is_rejected() {
        assert!(spreadsheet_id_from_url("https://docs.google.com/spreadsheets/").is_err());
    }
}
