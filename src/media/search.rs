//! Range and expression based volume selection

use regex::Regex;
use serde::Serialize;

use samqfs_api_types::{is_disk_media_type, AcslsVolume, DiskVolumeInfo, VsnInfo};

use super::backend::MediaManagement;
use super::{ManagementError, MediaManager};

/// How volumes get selected by name
///
/// A query uses either a VSN range or a regular expression, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Inclusive lexical range, an empty bound is open
    Range { start: String, end: String },
    /// Regular expression, matching anywhere in the name; empty matches all
    Expression { pattern: String },
}

impl SearchCriteria {
    pub fn range<S: Into<String>, E: Into<String>>(start: S, end: E) -> Self {
        SearchCriteria::Range {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn expression<S: Into<String>>(pattern: S) -> Self {
        SearchCriteria::Expression {
            pattern: pattern.into(),
        }
    }

    /// Matches every name
    pub fn is_wildcard(&self) -> bool {
        match self {
            SearchCriteria::Range { start, end } => start.is_empty() && end.is_empty(),
            SearchCriteria::Expression { pattern } => pattern.is_empty() || pattern == ".*",
        }
    }

    /// The range or expression as shown to the user
    pub fn expression_used(&self) -> String {
        if self.is_wildcard() {
            return String::new();
        }
        match self {
            SearchCriteria::Range { start, end } if end.is_empty() => start.clone(),
            SearchCriteria::Range { start, end } if start.is_empty() => end.clone(),
            SearchCriteria::Range { start, end } => format!("{}-{}", start, end),
            SearchCriteria::Expression { pattern } => pattern.clone(),
        }
    }

    pub fn matcher(&self) -> Result<VolumeMatcher, ManagementError> {
        if self.is_wildcard() {
            return Ok(VolumeMatcher::All);
        }
        match self {
            SearchCriteria::Range { start, end } => {
                if !start.is_empty() && !end.is_empty() && start > end {
                    return Err(ManagementError::generic(format!(
                        "invalid VSN range {}-{}",
                        start, end
                    )));
                }
                let bound = |s: &String| if s.is_empty() { None } else { Some(s.clone()) };
                Ok(VolumeMatcher::Range {
                    start: bound(start),
                    end: bound(end),
                })
            }
            SearchCriteria::Expression { pattern } => {
                let regex = Regex::new(pattern).map_err(|err| {
                    ManagementError::generic(format!("invalid VSN expression '{}' - {}", pattern, err))
                })?;
                Ok(VolumeMatcher::Regex(regex))
            }
        }
    }
}

/// Compiled [`SearchCriteria`]
#[derive(Debug, Clone)]
pub enum VolumeMatcher {
    All,
    Range {
        start: Option<String>,
        end: Option<String>,
    },
    Regex(Regex),
}

impl VolumeMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            VolumeMatcher::All => true,
            VolumeMatcher::Range { start, end } => {
                if let Some(start) = start {
                    if name < start.as_str() {
                        return false;
                    }
                }
                if let Some(end) = end {
                    if name > end.as_str() {
                        return false;
                    }
                }
                true
            }
            VolumeMatcher::Regex(regex) => regex.is_match(name),
        }
    }
}

/// Highest archive copy number
pub const MAX_ARCHIVE_COPY: u8 = 4;

/// Volume search request
#[derive(Debug, Clone)]
pub struct VolumeQuery {
    pub media_type: String,
    /// Restrict to members of this VSN pool
    pub pool: Option<String>,
    /// Restrict to the pools assigned to this archive copy (1-4)
    pub copy: Option<u8>,
    pub criteria: SearchCriteria,
}

impl VolumeQuery {
    pub fn new<S: Into<String>>(media_type: S, criteria: SearchCriteria) -> Self {
        Self {
            media_type: media_type.into(),
            pool: None,
            copy: None,
            criteria,
        }
    }

    pub fn pool<S: Into<String>>(mut self, pool: S) -> Self {
        self.pool = Some(pool.into());
        self
    }

    pub fn copy(mut self, copy: u8) -> Self {
        self.copy = Some(copy);
        self
    }

    fn check(&self) -> Result<(), ManagementError> {
        if let Some(copy) = self.copy {
            if copy == 0 || copy > MAX_ARCHIVE_COPY {
                return Err(ManagementError::generic(format!(
                    "invalid archive copy {} (expected 1-{})",
                    copy, MAX_ARCHIVE_COPY
                )));
            }
        }
        Ok(())
    }
}

/// Search result
///
/// `total_count` counts all matching volumes, `volumes` holds at most
/// the configured number of entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchResult<V> {
    pub volumes: Vec<V>,
    pub total_count: usize,
    /// Free space of all matching volumes (MiB)
    pub free_space_mb: u64,
    pub expression_used: String,
}

impl<V> SearchResult<V> {
    /// More volumes matched than returned, the range should be narrowed
    pub fn is_truncated(&self) -> bool {
        self.total_count > self.volumes.len()
    }
}

/// Something with a name we can match against
pub trait NamedVolume {
    fn volume_name(&self) -> &str;

    /// Free space (MiB)
    fn free_space_mb(&self) -> u64 {
        0
    }
}

/// Volume kinds the search operates on
pub trait SearchableVolume: NamedVolume + Sized {
    fn fetch_candidates(
        backend: &dyn MediaManagement,
        query: &VolumeQuery,
    ) -> Result<Vec<Self>, ManagementError>;
}

impl NamedVolume for VsnInfo {
    fn volume_name(&self) -> &str {
        &self.name
    }

    fn free_space_mb(&self) -> u64 {
        self.available
    }
}

impl SearchableVolume for VsnInfo {
    fn fetch_candidates(
        backend: &dyn MediaManagement,
        query: &VolumeQuery,
    ) -> Result<Vec<Self>, ManagementError> {
        if is_disk_media_type(&query.media_type) {
            return Err(ManagementError::generic(format!(
                "media type '{}' is a disk media type",
                query.media_type
            )));
        }
        let list = backend.media_volumes(&query.media_type, query.pool.as_deref(), query.copy)?;
        // unlabeled media has no name to match
        Ok(list.into_iter().filter(|vsn| vsn.labeled).collect())
    }
}

impl NamedVolume for DiskVolumeInfo {
    fn volume_name(&self) -> &str {
        &self.name
    }

    fn free_space_mb(&self) -> u64 {
        self.available
    }
}

impl SearchableVolume for DiskVolumeInfo {
    /// Pool and copy restrictions do not apply to disk volumes.
    fn fetch_candidates(
        backend: &dyn MediaManagement,
        query: &VolumeQuery,
    ) -> Result<Vec<Self>, ManagementError> {
        if !is_disk_media_type(&query.media_type) {
            return Err(ManagementError::generic(format!(
                "media type '{}' is not a disk media type",
                query.media_type
            )));
        }
        let list = backend.disk_volumes()?;
        Ok(list
            .into_iter()
            .filter(|volume| volume.media_type == query.media_type)
            .collect())
    }
}

impl NamedVolume for AcslsVolume {
    fn volume_name(&self) -> &str {
        &self.name
    }
}

/// Select matching volumes, sorted by name and limited to `cap` entries
pub fn evaluate<V: NamedVolume>(
    candidates: Vec<V>,
    criteria: &SearchCriteria,
    cap: usize,
) -> Result<SearchResult<V>, ManagementError> {
    let matcher = criteria.matcher()?;

    let mut volumes: Vec<V> = candidates
        .into_iter()
        .filter(|volume| matcher.matches(volume.volume_name()))
        .collect();
    volumes.sort_by(|a, b| a.volume_name().cmp(b.volume_name()));

    let total_count = volumes.len();
    let free_space_mb = volumes
        .iter()
        .fold(0u64, |sum, volume| sum.saturating_add(volume.free_space_mb()));
    volumes.truncate(cap);

    Ok(SearchResult {
        volumes,
        total_count,
        free_space_mb,
        expression_used: criteria.expression_used(),
    })
}

impl MediaManager {
    /// Search volumes of one kind
    pub fn search<V: SearchableVolume>(
        &self,
        query: &VolumeQuery,
    ) -> Result<SearchResult<V>, ManagementError> {
        query.check()?;
        let candidates = V::fetch_candidates(self.backend.as_ref(), query)?;
        let result = evaluate(candidates, &query.criteria, self.settings.max_entries)?;
        if result.is_truncated() {
            log::info!(
                "search '{}' matched {} volumes, returning {}",
                result.expression_used,
                result.total_count,
                result.volumes.len()
            );
        }
        Ok(result)
    }

    pub fn search_vsns(&self, query: &VolumeQuery) -> Result<SearchResult<VsnInfo>, ManagementError> {
        self.search(query)
    }

    pub fn search_disk_volumes(
        &self,
        query: &VolumeQuery,
    ) -> Result<SearchResult<DiskVolumeInfo>, ManagementError> {
        self.search(query)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Vol(&'static str, u64);

    impl NamedVolume for Vol {
        fn volume_name(&self) -> &str {
            self.0
        }

        fn free_space_mb(&self) -> u64 {
            self.1
        }
    }

    fn volumes() -> Vec<Vol> {
        vec![
            Vol("B001", 10),
            Vol("A000", 1),
            Vol("A500", 2),
            Vol("A999", 3),
            Vol("C100", 4),
        ]
    }

    fn names(result: &SearchResult<Vol>) -> Vec<&'static str> {
        result.volumes.iter().map(|v| v.0).collect()
    }

    #[test]
    fn test_range() -> Result<(), ManagementError> {
        let result = evaluate(volumes(), &SearchCriteria::range("A000", "A999"), 100)?;
        assert_eq!(names(&result), vec!["A000", "A500", "A999"]);
        assert_eq!(result.free_space_mb, 6);
        assert_eq!(result.expression_used, "A000-A999");

        let result = evaluate(volumes(), &SearchCriteria::range("B", ""), 100)?;
        assert_eq!(names(&result), vec!["B001", "C100"]);
        assert_eq!(result.expression_used, "B");

        let result = evaluate(volumes(), &SearchCriteria::range("", "A500"), 100)?;
        assert_eq!(names(&result), vec!["A000", "A500"]);

        assert!(evaluate(volumes(), &SearchCriteria::range("B", "A"), 100).is_err());
        Ok(())
    }

    #[test]
    fn test_empty_range_is_wildcard() -> Result<(), ManagementError> {
        let range = evaluate(volumes(), &SearchCriteria::range("", ""), 100)?;
        let wildcard = evaluate(volumes(), &SearchCriteria::expression(".*"), 100)?;
        let empty = evaluate(volumes(), &SearchCriteria::expression(""), 100)?;

        assert_eq!(range.volumes, wildcard.volumes);
        assert_eq!(range.volumes, empty.volumes);
        assert_eq!(range.total_count, 5);
        assert_eq!(range.expression_used, "");
        Ok(())
    }

    #[test]
    fn test_expression() -> Result<(), ManagementError> {
        let result = evaluate(volumes(), &SearchCriteria::expression("A[0-5].*"), 100)?;
        assert_eq!(names(&result), vec!["A000", "A500"]);

        // unanchored, a match anywhere in the name selects the volume
        let result = evaluate(volumes(), &SearchCriteria::expression("00"), 100)?;
        assert_eq!(names(&result), vec!["A000", "A500", "B001", "C100"]);

        let result = evaluate(volumes(), &SearchCriteria::expression("^A.*9$"), 100)?;
        assert_eq!(names(&result), vec!["A999"]);

        let err = evaluate(volumes(), &SearchCriteria::expression("A[0-"), 100).unwrap_err();
        assert!(err.message.starts_with("invalid VSN expression"));
        Ok(())
    }

    #[test]
    fn test_cap() -> Result<(), ManagementError> {
        let result = evaluate(volumes(), &SearchCriteria::expression(""), 2)?;
        assert_eq!(result.total_count, 5);
        assert_eq!(result.volumes.len(), 2);
        assert!(result.is_truncated());
        assert_eq!(result.free_space_mb, 20);

        let result = evaluate(volumes(), &SearchCriteria::expression("C.*"), 2)?;
        assert_eq!(result.total_count, 1);
        assert!(!result.is_truncated());
        Ok(())
    }

    #[test]
    fn test_free_space_saturates() -> Result<(), ManagementError> {
        let list = vec![Vol("A", u64::MAX), Vol("B", 10)];
        let result = evaluate(list, &SearchCriteria::range("", ""), 100)?;
        assert_eq!(result.free_space_mb, u64::MAX);
        Ok(())
    }

    #[test]
    fn test_copy_range() {
        let query = VolumeQuery::new("li", SearchCriteria::range("", "")).copy(5);
        assert!(query.check().is_err());
        let query = VolumeQuery::new("li", SearchCriteria::range("", "")).copy(4);
        assert!(query.check().is_ok());
    }
}
