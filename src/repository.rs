use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A monitored GitHub repository
///
/// Identity is the `(organization, name)` pair; collaborators do not take part
/// in equality.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Repository {
    /// The name of the organization that owns the repository
    pub organization: String,

    /// The name of the repository
    pub name: String,

    /// Logins whose activity never counts as external
    #[serde(default)]
    pub collaborators: BTreeSet<String>,
}

impl Repository {
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            collaborators: BTreeSet::new(),
        }
    }

    pub fn with_collaborators<I, S>(mut self, collaborators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collaborators = collaborators.into_iter().map(Into::into).collect();
        self
    }

    /// `organization/name`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.organization, self.name)
    }

    pub fn is_collaborator(&self, login: &str) -> bool {
        self.collaborators.contains(login)
    }

    /// Configuration keys for this repository, most specific first
    pub fn lookup_keys(&self) -> [String; 3] {
        [self.slug(), self.name.clone(), self.organization.clone()]
    }
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.organization == other.organization && self.name == other.name
    }
}

impl Eq for Repository {}

impl Hash for Repository {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.organization.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.name)
    }
}

/// Resolve per-repository settings from a map keyed by slug, repository name
/// or organization name, preferring the most specific key present
pub fn find_for<'a, V>(settings: &'a HashMap<String, V>, repository: &Repository) -> Option<&'a V> {
    repository
        .lookup_keys()
        .iter()
        .find_map(|key| settings.get(key))
}
