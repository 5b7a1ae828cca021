use std::fmt;

/// Outcome of one submission. Unresolved when the scheduler's reply carried no
/// recognisable job id; the job may still have been queued.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct JobRecord(Option<String>);

impl JobRecord {
    pub fn resolved<S: Into<String>>(id: S) -> Self {
        JobRecord(Some(id.into()))
    }

    pub fn unresolved() -> Self {
        JobRecord(None)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_deref().unwrap_or(""))
    }
}

/// Ids of all resolved records, in order. Feed this to a downstream stage's depends_on.
pub fn resolved_ids<'a>(records: impl IntoIterator<Item = &'a JobRecord>) -> Vec<String> {
    records
        .into_iter()
        .filter_map(|r| r.id().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_ids_skip_unresolved() {
        let records = vec![
            JobRecord::resolved("481213"),
            JobRecord::unresolved(),
            JobRecord::resolved("481214"),
        ];
        assert_eq!(resolved_ids(&records), vec!["481213", "481214"]);
        assert_eq!(JobRecord::unresolved().to_string(), "");
    }
}
